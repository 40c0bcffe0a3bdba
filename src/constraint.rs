//! The flat constraint records produced by compilation

use serde::Serialize;

/// Attribute of a view that a constraint can reference.
///
/// `Const` marks a pure-constant right-hand side: the consumer binds it to an
/// unconstrained variable, so `view1.attr1 == c` effectively pins attr1 to c.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Const,
    Left,
    Right,
    Top,
    Bottom,
    Width,
    Height,
    CenterX,
    CenterY,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Const => "const",
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Top => "top",
            Attribute::Bottom => "bottom",
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::CenterX => "centerX",
            Attribute::CenterY => "centerY",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relation between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relation {
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::LessOrEqual => "<=",
            Relation::Equal => "==",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One symbolic constraint: `view1.attr1 REL view2.attr2 * multiplier + constant`.
///
/// View names are plain strings; the empty string and `"^"` both denote the
/// superview to consumers. Synthesized spacer views carry names no author
/// could write (they start with `-` or `~`), so they never collide with
/// declared views.
///
/// An unset `constant` is meaningful: it asks the consumer to substitute its
/// default spacing. It must not be conflated with `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintDef {
    pub view1: String,
    pub attr1: Attribute,
    pub relation: Relation,
    pub view2: String,
    pub attr2: Attribute,
    pub multiplier: Option<f64>,
    pub constant: Option<f64>,
    pub priority: Option<u32>,
}

impl ConstraintDef {
    /// Create a constraint with multiplier 1, constant 0 and no priority.
    pub fn new(
        view1: impl Into<String>,
        attr1: Attribute,
        relation: Relation,
        view2: impl Into<String>,
        attr2: Attribute,
    ) -> Self {
        Self {
            view1: view1.into(),
            attr1,
            relation,
            view2: view2.into(),
            attr2,
            multiplier: Some(1.0),
            constant: Some(0.0),
            priority: None,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn with_constant(mut self, constant: impl Into<Option<f64>>) -> Self {
        self.constant = constant.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Option<u32>>) -> Self {
        self.priority = priority.into();
        self
    }
}

impl std::fmt::Display for ConstraintDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} {} {}.{}",
            self.view1, self.attr1, self.relation, self.view2, self.attr2
        )?;
        match self.multiplier {
            Some(m) => write!(f, " * {}", m)?,
            None => write!(f, " * 1")?,
        }
        match self.constant {
            Some(c) => write!(f, " + {}", c)?,
            None => write!(f, " + default")?,
        }
        match self.priority {
            Some(p) => write!(f, " @ {}", p)?,
            None => write!(f, " @ default")?,
        }
        Ok(())
    }
}
