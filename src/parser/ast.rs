//! Abstract syntax tree for the Extended Visual Format Language

use crate::constraint::{Attribute, Relation};

/// Axis selector prefixing a visual row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    /// `HV:` / `VH:` — the row is lowered on both axes, horizontal first.
    Both,
}

impl Orientation {
    pub fn has_horizontal(&self) -> bool {
        matches!(self, Orientation::Horizontal | Orientation::Both)
    }

    pub fn has_vertical(&self) -> bool {
        matches!(self, Orientation::Vertical | Orientation::Both)
    }
}

/// Multiplier operator: `*n` scales by n, `/n` by 1/n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSign {
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplier {
    pub op: OpSign,
    pub number: f64,
}

impl Multiplier {
    /// Effective scale factor.
    pub fn value(&self) -> f64 {
        match self.op {
            OpSign::Mul => self.number,
            OpSign::Div => 1.0 / self.number,
        }
    }
}

/// `number '%'` with an optional signed additive constant, e.g. `50%+123`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentage {
    pub number: f64,
    pub constant: Option<f64>,
}

impl Percentage {
    /// Fraction of the reference dimension (`50%` → 0.5).
    pub fn value(&self) -> f64 {
        self.number / 100.0
    }
}

/// Reference to another view inside a predicate, e.g. `asdf.left*10+3`.
///
/// The name `-` refers to the enclosing connection's spacer and `^` to the
/// current superview.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPredicate {
    pub view_name: String,
    pub attribute: Option<Attribute>,
    pub multiplier: Option<Multiplier>,
    pub constant: Option<f64>,
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateObject {
    Percentage(Percentage),
    Constant(f64),
    View(ViewPredicate),
}

/// `relation? object priority?`; the relation defaults to `==`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub relation: Option<Relation>,
    pub object: PredicateObject,
    pub priority: Option<u32>,
}

/// The body of a `-…-` or `~…~` connection.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateList {
    /// `@n` alone: keep default spacing semantics but at this priority.
    Priority(u32),
    Percentage(Percentage),
    Constant(f64),
    /// Parenthesized list of full predicates.
    List(Vec<Predicate>),
}

/// How two view groups are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `->` — explicit disconnection, lowers to nothing.
    Arrow,
    /// `-` — default spacing (or the given predicates).
    Hyphen,
    /// `~` — synthesized spacer view.
    Tilde,
    /// Adjacent groups with no connector: zero spacing.
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub predicates: Option<PredicateList>,
    pub connector: Connector,
}

/// Stand-in for an absent `|` attachment: an arrow lowers to nothing.
pub(crate) static DISCONNECTION: Connection = Connection {
    predicates: None,
    connector: Connector::Arrow,
};

/// One view inside a group: `name`, optional inline size predicates,
/// optional cascade hanging further groups off this view.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: String,
    pub predicates: Vec<Predicate>,
    pub cascade: Option<CascadedViews>,
}

impl View {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicates: Vec::new(),
            cascade: None,
        }
    }

    /// A single-member group holding just this view's name.
    pub fn as_group(&self) -> ViewGroup {
        vec![View::named(self.name.clone())]
    }
}

pub type ViewGroup = Vec<View>;

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionViewGroupPair {
    pub connection: Connection,
    pub views: ViewGroup,
}

/// `':' (connection viewGroup)+ connection` — a sub-layout anchored at the
/// owning view on both ends. `rest` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadedViews {
    pub rest: Vec<ConnectionViewGroupPair>,
    pub to_super: Connection,
}

impl CascadedViews {
    /// Connection from the anchor view to the first group.
    pub fn super_to(&self) -> &Connection {
        &self.rest[0].connection
    }

    pub fn first(&self) -> &[View] {
        &self.rest[0].views
    }
}

/// One visual format: `'|'? (connection viewGroup)+ connection '|'?`.
///
/// The leading and trailing pipes attach the chain to the superview; without
/// them the corresponding end floats free. `rest` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFormat {
    pub attach_leading: bool,
    pub rest: Vec<ConnectionViewGroupPair>,
    pub trailing: Connection,
    pub attach_trailing: bool,
}

impl VisualFormat {
    /// Connection from the superview edge to the first group, or a
    /// disconnection when there is no leading `|`.
    pub fn super_to(&self) -> &Connection {
        if self.attach_leading {
            &self.rest[0].connection
        } else {
            &DISCONNECTION
        }
    }

    /// Connection from the last group to the superview edge, or a
    /// disconnection when there is no trailing `|`.
    pub fn to_super(&self) -> &Connection {
        if self.attach_trailing {
            &self.trailing
        } else {
            &DISCONNECTION
        }
    }
}

/// `attribute '(' predicate,… ')'` inside a constraint format.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePredicate {
    pub attribute: Attribute,
    pub predicates: Vec<Predicate>,
}

/// One constraint format: one or more view names followed by attribute
/// predicate blocks, e.g. `[a,b,c].centerX(100%+123)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintFormat {
    pub views: Vec<String>,
    pub predicates: Vec<AttributePredicate>,
}

/// One row of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatRow {
    Visual {
        orientation: Orientation,
        items: Vec<VisualFormat>,
    },
    Constraint(Vec<ConstraintFormat>),
}

/// Root node: the parsed rows in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub rows: Vec<FormatRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_values() {
        let mul = |op, number| Multiplier { op, number }.value();
        assert_eq!(mul(OpSign::Mul, -3.0), -3.0);
        assert_eq!(mul(OpSign::Div, 10.0), 0.1);
        assert_eq!(mul(OpSign::Mul, 1.0), 1.0);
        assert_eq!(mul(OpSign::Div, -2.0), -0.5);
    }

    #[test]
    fn test_percentage_value() {
        let pct = Percentage {
            number: 50.0,
            constant: Some(123.0),
        };
        assert_eq!(pct.value(), 0.5);
    }

    #[test]
    fn test_orientation_fan_out() {
        assert!(Orientation::Both.has_horizontal());
        assert!(Orientation::Both.has_vertical());
        assert!(Orientation::Horizontal.has_horizontal());
        assert!(!Orientation::Horizontal.has_vertical());
        assert!(!Orientation::Vertical.has_horizontal());
    }

    #[test]
    fn test_visual_format_detached_ends() {
        let format = VisualFormat {
            attach_leading: false,
            rest: vec![ConnectionViewGroupPair {
                connection: Connection {
                    predicates: None,
                    connector: Connector::Hyphen,
                },
                views: vec![View::named("a")],
            }],
            trailing: Connection {
                predicates: None,
                connector: Connector::Hyphen,
            },
            attach_trailing: false,
        };
        assert_eq!(format.super_to().connector, Connector::Arrow);
        assert_eq!(format.to_super().connector, Connector::Arrow);

        let attached = VisualFormat {
            attach_leading: true,
            attach_trailing: true,
            ..format
        };
        assert_eq!(attached.super_to().connector, Connector::Hyphen);
        assert_eq!(attached.to_super().connector, Connector::Hyphen);
    }
}
