//! Lowering: walk the AST and emit flat constraint records
//!
//! Rows fan out per axis (`HV:` lowers horizontally first, then vertically).
//! A visual format and a `:`-cascade lower through the same walk; only the
//! anchor differs — the superview for a row, the owning view for a cascade.

use crate::constraint::{Attribute, ConstraintDef, Relation};
use crate::parser::ast::{
    CascadedViews, Connection, ConnectionViewGroupPair, Connector, Document, FormatRow, Predicate,
    PredicateList, PredicateObject, View, ViewGroup,
};

/// Axis a visual row is currently lowered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn size_attribute(self) -> Attribute {
        match self {
            Axis::Horizontal => Attribute::Width,
            Axis::Vertical => Attribute::Height,
        }
    }

    /// Leading and trailing edge, in flow order.
    fn edge_attributes(self) -> (Attribute, Attribute) {
        match self {
            Axis::Horizontal => (Attribute::Left, Attribute::Right),
            Axis::Vertical => (Attribute::Top, Attribute::Bottom),
        }
    }

    fn letter(self) -> char {
        match self {
            Axis::Horizontal => 'H',
            Axis::Vertical => 'V',
        }
    }
}

/// Where a connection sits relative to the current superview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionRole {
    FromSuper,
    Sibling,
    ToSuper,
}

/// How a predicate's second operand resolves.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    /// Inside a visual row: `^` and bare constants resolve against this view.
    Visual { super_name: &'a str },
    /// Inside a `C:` row: the second operand is always the superview itself.
    ConstraintFormat,
}

/// Borrowed cascade: both a visual format and a nested `:`-cascade present
/// themselves this way. `rest` is never empty.
#[derive(Clone, Copy)]
struct CascadeRef<'a> {
    super_to: &'a Connection,
    rest: &'a [ConnectionViewGroupPair],
    to_super: &'a Connection,
}

impl<'a> CascadeRef<'a> {
    fn of(cascade: &'a CascadedViews) -> Self {
        Self {
            super_to: cascade.super_to(),
            rest: &cascade.rest,
            to_super: &cascade.to_super,
        }
    }

    fn first(&self) -> &'a ViewGroup {
        &self.rest[0].views
    }
}

/// Lower a parsed document to constraint records.
///
/// `default_priority` is applied once, afterwards, to every record whose
/// priority is still unset; records with an explicit `@` keep theirs.
pub fn lower(document: &Document, default_priority: Option<u32>) -> Vec<ConstraintDef> {
    let mut lowerer = Lowerer { output: Vec::new() };
    lowerer.lower_document(document);

    let mut output = lowerer.output;
    if let Some(priority) = default_priority {
        for def in &mut output {
            def.priority.get_or_insert(priority);
        }
    }
    output
}

struct Lowerer {
    output: Vec<ConstraintDef>,
}

impl Lowerer {
    fn lower_document(&mut self, document: &Document) {
        let root = View::named("^");

        for row in &document.rows {
            match row {
                FormatRow::Visual { orientation, items } => {
                    for format in items {
                        let cascade = CascadeRef {
                            super_to: format.super_to(),
                            rest: &format.rest,
                            to_super: format.to_super(),
                        };
                        if orientation.has_horizontal() {
                            self.lower_cascade(cascade, Axis::Horizontal, &root);
                        }
                        if orientation.has_vertical() {
                            self.lower_cascade(cascade, Axis::Vertical, &root);
                        }
                    }
                }
                FormatRow::Constraint(formats) => {
                    for format in formats {
                        for view in &format.views {
                            for block in &format.predicates {
                                for predicate in &block.predicates {
                                    self.lower_predicate(
                                        predicate,
                                        view,
                                        block.attribute,
                                        Scope::ConstraintFormat,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn lower_cascade(&mut self, cascade: CascadeRef<'_>, axis: Axis, anchor: &View) {
        let super_group = anchor.as_group();
        let super_name = anchor.name.as_str();
        let mut first_tilde: Option<String> = None;

        let mut prev_group = cascade.first();
        self.lower_connection(
            cascade.super_to,
            axis,
            &super_group,
            prev_group,
            ConnectionRole::FromSuper,
            super_name,
            &mut first_tilde,
        );
        self.lower_group(prev_group, axis, super_name);

        for pair in &cascade.rest[1..] {
            self.lower_group(&pair.views, axis, super_name);
            self.lower_connection(
                &pair.connection,
                axis,
                prev_group,
                &pair.views,
                ConnectionRole::Sibling,
                super_name,
                &mut first_tilde,
            );
            prev_group = &pair.views;
        }

        self.lower_connection(
            cascade.to_super,
            axis,
            prev_group,
            &super_group,
            ConnectionRole::ToSuper,
            super_name,
            &mut first_tilde,
        );
    }

    fn lower_group(&mut self, group: &[View], axis: Axis, super_name: &str) {
        for view in group {
            let size_attr = axis.size_attribute();
            for predicate in &view.predicates {
                self.lower_predicate(
                    predicate,
                    &view.name,
                    size_attr,
                    Scope::Visual { super_name },
                );
            }

            if let Some(cascade) = &view.cascade {
                self.lower_cascade(CascadeRef::of(cascade), axis, view);
            }
        }
    }

    fn lower_predicate(
        &mut self,
        predicate: &Predicate,
        view1: &str,
        attr1: Attribute,
        scope: Scope<'_>,
    ) {
        let relation = predicate.relation.unwrap_or(Relation::Equal);

        match &predicate.object {
            PredicateObject::Constant(value) => {
                let (view2, attr2) = match scope {
                    Scope::Visual { super_name } => (super_name, Attribute::Const),
                    Scope::ConstraintFormat => ("^", attr1),
                };
                self.output.push(
                    ConstraintDef::new(view1, attr1, relation, view2, attr2)
                        .with_constant(*value)
                        .with_priority(predicate.priority),
                );
            }
            PredicateObject::Percentage(percentage) => {
                let view2 = match scope {
                    Scope::Visual { super_name } => super_name,
                    Scope::ConstraintFormat => "^",
                };
                self.output.push(
                    ConstraintDef::new(view1, attr1, relation, view2, attr1)
                        .with_multiplier(percentage.value())
                        .with_constant(percentage.constant.unwrap_or(0.0))
                        .with_priority(predicate.priority),
                );
            }
            PredicateObject::View(reference) => {
                let view2 = match scope {
                    Scope::ConstraintFormat => "^",
                    Scope::Visual { super_name } => {
                        if reference.view_name == "^" {
                            super_name
                        } else {
                            reference.view_name.as_str()
                        }
                    }
                };
                self.output.push(
                    ConstraintDef::new(
                        view1,
                        attr1,
                        relation,
                        view2,
                        reference.attribute.unwrap_or(attr1),
                    )
                    .with_multiplier(reference.multiplier.map_or(1.0, |m| m.value()))
                    .with_constant(reference.constant.unwrap_or(0.0))
                    .with_priority(predicate.priority),
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_connection(
        &mut self,
        connection: &Connection,
        axis: Axis,
        prev_group: &[View],
        next_group: &[View],
        role: ConnectionRole,
        super_name: &str,
        first_tilde: &mut Option<String>,
    ) {
        let spacer = match connection.connector {
            Connector::Arrow => return,
            Connector::Closed => String::new(),
            Connector::Hyphen => spacer_name('-', axis, prev_group, next_group),
            Connector::Tilde => spacer_name('~', axis, prev_group, next_group),
        };

        let size_attr = axis.size_attribute();
        let is_tilde = connection.connector == Connector::Tilde;

        if is_tilde {
            match first_tilde.as_ref() {
                None => *first_tilde = Some(spacer.clone()),
                Some(first) => self.output.push(ConstraintDef::new(
                    &spacer,
                    size_attr,
                    Relation::Equal,
                    first.as_str(),
                    size_attr,
                )),
            }
            self.connect_spacer(&spacer, axis, prev_group, next_group, role);
        }

        let Some(predicates) = &connection.predicates else {
            if !is_tilde {
                // Closed groups touch exactly; a bare hyphen leaves the gap
                // to the consumer's default spacing.
                let constant = match connection.connector {
                    Connector::Hyphen => None,
                    _ => Some(0.0),
                };
                self.connect_groups(
                    axis,
                    prev_group,
                    next_group,
                    role,
                    Relation::Equal,
                    constant,
                    None,
                );
            }
            return;
        };

        match predicates {
            PredicateList::Constant(value) => {
                if is_tilde {
                    self.output.push(
                        ConstraintDef::new(
                            &spacer,
                            size_attr,
                            Relation::Equal,
                            super_name,
                            size_attr,
                        )
                        .with_constant(-value),
                    );
                } else {
                    self.connect_groups(
                        axis,
                        prev_group,
                        next_group,
                        role,
                        Relation::Equal,
                        Some(*value),
                        None,
                    );
                }
            }
            PredicateList::Percentage(percentage) => {
                self.output.push(
                    ConstraintDef::new(&spacer, size_attr, Relation::Equal, super_name, size_attr)
                        .with_multiplier(percentage.value())
                        .with_constant(percentage.constant.unwrap_or(0.0)),
                );
                if !is_tilde {
                    self.connect_spacer(&spacer, axis, prev_group, next_group, role);
                }
            }
            PredicateList::Priority(priority) => {
                if is_tilde {
                    self.output.push(
                        ConstraintDef::new(
                            &spacer,
                            size_attr,
                            Relation::Equal,
                            super_name,
                            size_attr,
                        )
                        .with_priority(*priority),
                    );
                } else {
                    self.connect_groups(
                        axis,
                        prev_group,
                        next_group,
                        role,
                        Relation::Equal,
                        None,
                        Some(*priority),
                    );
                }
            }
            PredicateList::List(list) => {
                if let [only] = list.as_slice() {
                    if let PredicateObject::Constant(value) = &only.object {
                        let relation = only.relation.unwrap_or(Relation::Equal);
                        if is_tilde {
                            self.output.push(
                                ConstraintDef::new(
                                    &spacer,
                                    size_attr,
                                    relation,
                                    super_name,
                                    size_attr,
                                )
                                .with_constant(*value)
                                .with_priority(only.priority),
                            );
                        } else {
                            self.connect_groups(
                                axis,
                                prev_group,
                                next_group,
                                role,
                                relation,
                                Some(*value),
                                only.priority,
                            );
                        }
                        return;
                    }
                }

                if !is_tilde {
                    self.connect_spacer(&spacer, axis, prev_group, next_group, role);
                }
                for predicate in list {
                    self.lower_predicate(
                        predicate,
                        &spacer,
                        size_attr,
                        Scope::Visual { super_name },
                    );
                }
            }
        }
    }

    /// Pin a spacer's edges to its neighbor groups.
    fn connect_spacer(
        &mut self,
        spacer: &str,
        axis: Axis,
        prev_group: &[View],
        next_group: &[View],
        role: ConnectionRole,
    ) {
        let (lead, trail) = axis.edge_attributes();

        let attr2 = if role == ConnectionRole::FromSuper {
            lead
        } else {
            trail
        };
        for view in prev_group {
            self.output.push(ConstraintDef::new(
                spacer,
                lead,
                Relation::Equal,
                &view.name,
                attr2,
            ));
        }

        let attr2 = if role == ConnectionRole::ToSuper {
            trail
        } else {
            lead
        };
        for view in next_group {
            self.output.push(ConstraintDef::new(
                spacer,
                trail,
                Relation::Equal,
                &view.name,
                attr2,
            ));
        }
    }

    /// Join every view of the previous group to every view of the next one.
    #[allow(clippy::too_many_arguments)]
    fn connect_groups(
        &mut self,
        axis: Axis,
        prev_group: &[View],
        next_group: &[View],
        role: ConnectionRole,
        relation: Relation,
        constant: Option<f64>,
        priority: Option<u32>,
    ) {
        let (lead, trail) = axis.edge_attributes();
        let (attr1, attr2) = match role {
            ConnectionRole::FromSuper => (lead, lead),
            ConnectionRole::Sibling => (trail, lead),
            ConnectionRole::ToSuper => (trail, trail),
        };

        // The gap sits on the left-hand side of the relation, so it flips
        // sign when moved to the right.
        let constant = constant.map(|value| -value);
        for view1 in prev_group {
            for view2 in next_group {
                self.output.push(
                    ConstraintDef::new(&view1.name, attr1, relation, &view2.name, attr2)
                        .with_constant(constant)
                        .with_priority(priority),
                );
            }
        }
    }
}

/// Deterministic name for a synthesized spacer, derived from the connector,
/// the axis and the neighbor groups: `[a]-[b]` on H yields `-Ha-b`.
fn spacer_name(connector: char, axis: Axis, prev: &[View], next: &[View]) -> String {
    let mut name = String::new();
    name.push(connector);
    name.push(axis.letter());
    append_group_name(prev, &mut name);
    name.push(connector);
    append_group_name(next, &mut name);
    name
}

fn append_group_name(group: &[View], out: &mut String) {
    match group {
        // The superview group reads as a wall.
        [only] if only.name.is_empty() || only.name == "^" => out.push('|'),
        _ => {
            for view in group {
                out.push_str(&view.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn compile(input: &str) -> Vec<ConstraintDef> {
        lower(&parse(input).unwrap(), None)
    }

    use crate::constraint::Attribute::{Bottom, Height, Left, Right, Top, Width};
    use crate::constraint::Relation::{Equal, GreaterOrEqual};

    #[test]
    fn test_closed_attachment_touches() {
        assert_eq!(
            compile("H:|[a]|"),
            vec![
                ConstraintDef::new("^", Left, Equal, "a", Left).with_constant(-0.0),
                ConstraintDef::new("a", Right, Equal, "^", Right).with_constant(-0.0),
            ]
        );
    }

    #[test]
    fn test_hyphen_defaults_to_consumer_spacing() {
        assert_eq!(
            compile("H:|-[a]-|"),
            vec![
                ConstraintDef::new("^", Left, Equal, "a", Left).with_constant(None),
                ConstraintDef::new("a", Right, Equal, "^", Right).with_constant(None),
            ]
        );
    }

    #[test]
    fn test_sibling_constant_gap_is_negated() {
        assert_eq!(
            compile("H:[a]-10-[b]"),
            vec![ConstraintDef::new("a", Right, Equal, "b", Left).with_constant(-10.0)]
        );
    }

    #[test]
    fn test_group_cross_product() {
        assert_eq!(
            compile("H:[a,b][c,d]"),
            vec![
                ConstraintDef::new("a", Right, Equal, "c", Left).with_constant(-0.0),
                ConstraintDef::new("a", Right, Equal, "d", Left).with_constant(-0.0),
                ConstraintDef::new("b", Right, Equal, "c", Left).with_constant(-0.0),
                ConstraintDef::new("b", Right, Equal, "d", Left).with_constant(-0.0),
            ]
        );
    }

    #[test]
    fn test_arrow_disconnects() {
        assert_eq!(compile("H:[a]->[b]"), vec![]);
    }

    #[test]
    fn test_priority_only_connection() {
        assert_eq!(
            compile("H:[a]-@33-[b]"),
            vec![ConstraintDef::new("a", Right, Equal, "b", Left)
                .with_constant(None)
                .with_priority(33)]
        );
    }

    #[test]
    fn test_percentage_connection_synthesizes_spacer() {
        assert_eq!(
            compile("H:[a]-50%+7-[b]"),
            vec![
                ConstraintDef::new("-Ha-b", Width, Equal, "^", Width)
                    .with_multiplier(0.5)
                    .with_constant(7.0),
                ConstraintDef::new("-Ha-b", Left, Equal, "a", Right),
                ConstraintDef::new("-Ha-b", Right, Equal, "b", Left),
            ]
        );
    }

    #[test]
    fn test_predicate_list_connection_targets_spacer() {
        assert_eq!(
            compile("H:[a]-(b.width,>=10)-[c]"),
            vec![
                ConstraintDef::new("-Ha-c", Left, Equal, "a", Right),
                ConstraintDef::new("-Ha-c", Right, Equal, "c", Left),
                ConstraintDef::new("-Ha-c", Width, Equal, "b", Width),
                ConstraintDef::new("-Ha-c", Width, GreaterOrEqual, "^", Attribute::Const)
                    .with_constant(10.0),
            ]
        );
    }

    #[test]
    fn test_single_constant_list_keeps_relation_and_priority() {
        assert_eq!(
            compile("H:[c]-(444@555)-|"),
            vec![ConstraintDef::new("c", Right, Equal, "^", Right)
                .with_constant(-444.0)
                .with_priority(555)]
        );
    }

    #[test]
    fn test_tilde_sizes_against_superview() {
        assert_eq!(
            compile("H:[a]~10~[b]"),
            vec![
                ConstraintDef::new("~Ha~b", Left, Equal, "a", Right),
                ConstraintDef::new("~Ha~b", Right, Equal, "b", Left),
                ConstraintDef::new("~Ha~b", Width, Equal, "^", Width).with_constant(-10.0),
            ]
        );
    }

    #[test]
    fn test_tilde_chain_equalizes_spacers() {
        let defs = compile("H:|~[a]~[b]~|");
        assert_eq!(
            defs,
            vec![
                ConstraintDef::new("~H|~a", Left, Equal, "^", Left),
                ConstraintDef::new("~H|~a", Right, Equal, "a", Left),
                ConstraintDef::new("~Ha~b", Width, Equal, "~H|~a", Width),
                ConstraintDef::new("~Ha~b", Left, Equal, "a", Right),
                ConstraintDef::new("~Ha~b", Right, Equal, "b", Left),
                ConstraintDef::new("~Hb~|", Width, Equal, "~H|~a", Width),
                ConstraintDef::new("~Hb~|", Left, Equal, "b", Right),
                ConstraintDef::new("~Hb~|", Right, Equal, "^", Right),
            ]
        );

        // N tildes, N-1 size equalities.
        let equalities = defs
            .iter()
            .filter(|def| def.attr1 == Width && def.attr2 == Width)
            .count();
        assert_eq!(equalities, 2);
    }

    #[test]
    fn test_tilde_chain_is_per_cascade() {
        // Two separate rows each start their own chain: no cross-row equality.
        let defs = compile("H:|~[a]| H:|~[b]|");
        assert!(defs
            .iter()
            .all(|def| !(def.attr1 == Width && def.attr2 == Width)));
    }

    #[test]
    fn test_inline_view_predicate() {
        assert_eq!(
            compile("H:[b(123)]"),
            vec![ConstraintDef::new("b", Width, Equal, "^", Attribute::Const).with_constant(123.0)]
        );
    }

    #[test]
    fn test_cascade_anchors_at_owning_view() {
        assert_eq!(
            compile("H:[g:-[x]-]"),
            vec![
                ConstraintDef::new("g", Left, Equal, "x", Left).with_constant(None),
                ConstraintDef::new("x", Right, Equal, "g", Right).with_constant(None),
            ]
        );
    }

    #[test]
    fn test_constraint_row_constant_pins_attribute() {
        assert_eq!(
            compile("C:a.width(100)"),
            vec![ConstraintDef::new("a", Width, Equal, "^", Width).with_constant(100.0)]
        );
    }

    #[test]
    fn test_constraint_row_fans_out_over_views() {
        let expected: Vec<ConstraintDef> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                ConstraintDef::new(*name, Attribute::CenterX, Equal, "^", Attribute::CenterX)
                    .with_constant(123.0)
            })
            .collect();
        assert_eq!(compile("C:[a,b,c].centerX(100%+123)"), expected);
    }

    #[test]
    fn test_both_orientations_fan_out() {
        assert_eq!(
            compile("HV:|[x]|"),
            vec![
                ConstraintDef::new("^", Left, Equal, "x", Left).with_constant(-0.0),
                ConstraintDef::new("x", Right, Equal, "^", Right).with_constant(-0.0),
                ConstraintDef::new("^", Top, Equal, "x", Top).with_constant(-0.0),
                ConstraintDef::new("x", Bottom, Equal, "^", Bottom).with_constant(-0.0),
            ]
        );
    }

    #[test]
    fn test_vertical_axis_uses_height_edges() {
        assert_eq!(
            compile("V:[a]-55%-[b]"),
            vec![
                ConstraintDef::new("-Va-b", Height, Equal, "^", Height).with_multiplier(0.55),
                ConstraintDef::new("-Va-b", Top, Equal, "a", Bottom),
                ConstraintDef::new("-Va-b", Bottom, Equal, "b", Top),
            ]
        );
    }

    #[test]
    fn test_default_priority_fills_unset_only() {
        let document = parse("H:[a]-(444@555)-[b] V:[c]-10-[d]").unwrap();
        let defs = lower(&document, Some(500));
        assert_eq!(defs[0].priority, Some(555));
        assert_eq!(defs[1].priority, Some(500));
    }
}
