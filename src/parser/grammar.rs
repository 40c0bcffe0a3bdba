//! Parser implementation using chumsky
//!
//! The grammar is scannerless: format strings are whitespace-sensitive
//! (single spaces separate formats inside a row, rows may abut with no
//! separator at all), so the parsers below work directly on characters.

use chumsky::prelude::*;

use crate::constraint::{Attribute, Relation};
use crate::parser::ast::*;
use crate::SyntaxError;

type ParserErr<'a> = extra::Err<Rich<'a, char>>;

/// Parse a complete format string into its rows.
///
/// The whole input must be consumed; anything left over is a syntax error
/// carrying the offset where parsing stopped.
pub fn parse(input: &str) -> Result<Document, SyntaxError> {
    document()
        .parse(input)
        .into_result()
        .map_err(|errors| SyntaxError::from_rich(errors, input))
}

/// Digit-string value without going through the float parser in std, so a
/// fraction's digit count stays available for scaling.
fn decimal_value(digits: &str) -> f64 {
    digits
        .bytes()
        .fold(0.0, |acc, b| acc * 10.0 + f64::from(b - b'0'))
}

fn digits<'a>() -> impl Parser<'a, &'a str, String, ParserErr<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// Unsigned decimal with optional fraction. A trailing `.` without fraction
/// digits is left unconsumed, matching `12.` parsing as `12` followed by `.`.
fn magnitude<'a>() -> impl Parser<'a, &'a str, f64, ParserErr<'a>> + Clone {
    digits()
        .then(just('.').ignore_then(digits()).or_not())
        .map(|(whole, fraction)| {
            let mut value = decimal_value(&whole);
            if let Some(fraction) = &fraction {
                value += decimal_value(fraction) / 10f64.powi(fraction.len() as i32);
            }
            value
        })
}

fn number<'a>() -> impl Parser<'a, &'a str, f64, ParserErr<'a>> + Clone {
    one_of("+-")
        .or_not()
        .then(magnitude())
        .map(|(sign, value)| if sign == Some('-') { -value } else { value })
}

/// Like `number` but the sign is mandatory. Keeps `[b]-10-[c]` unambiguous:
/// only an explicitly signed number can trail a percentage or view reference.
fn deltanumber<'a>() -> impl Parser<'a, &'a str, f64, ParserErr<'a>> + Clone {
    one_of("+-")
        .then(magnitude())
        .map(|(sign, value)| if sign == '-' { -value } else { value })
}

fn uint<'a>() -> impl Parser<'a, &'a str, u32, ParserErr<'a>> + Clone {
    digits().try_map(|text, span| {
        text.parse::<u32>()
            .map_err(|_| Rich::custom(span, "priority does not fit in 32 bits"))
    })
}

fn priority<'a>() -> impl Parser<'a, &'a str, u32, ParserErr<'a>> + Clone {
    just('@').ignore_then(uint())
}

// Note: order matters! Long forms first so `.left` is not read as `.l`
// followed by stray `eft`.
fn attribute<'a>() -> impl Parser<'a, &'a str, Attribute, ParserErr<'a>> + Clone {
    choice((
        just(".left").to(Attribute::Left),
        just(".right").to(Attribute::Right),
        just(".top").to(Attribute::Top),
        just(".bottom").to(Attribute::Bottom),
        just(".width").to(Attribute::Width),
        just(".height").to(Attribute::Height),
        just(".centerX").to(Attribute::CenterX),
        just(".centerY").to(Attribute::CenterY),
        just(".l").to(Attribute::Left),
        just(".r").to(Attribute::Right),
        just(".t").to(Attribute::Top),
        just(".b").to(Attribute::Bottom),
        just(".w").to(Attribute::Width),
        just(".h").to(Attribute::Height),
        just(".cx").to(Attribute::CenterX),
        just(".cy").to(Attribute::CenterY),
    ))
}

// `HV:`/`VH:` before the single-axis forms for the same reason.
fn orientation<'a>() -> impl Parser<'a, &'a str, Orientation, ParserErr<'a>> + Clone {
    choice((
        just("HV:").to(Orientation::Both),
        just("VH:").to(Orientation::Both),
        just("H:").to(Orientation::Horizontal),
        just("V:").to(Orientation::Vertical),
    ))
}

fn relation<'a>() -> impl Parser<'a, &'a str, Relation, ParserErr<'a>> + Clone {
    choice((
        just("==").to(Relation::Equal),
        just(">=").to(Relation::GreaterOrEqual),
        just("<=").to(Relation::LessOrEqual),
    ))
}

fn identifier<'a>() -> impl Parser<'a, &'a str, String, ParserErr<'a>> + Clone {
    any()
        .filter(|c: &char| c.is_ascii_alphabetic())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated()
                .collect::<String>(),
        )
        .map(|(first, rest)| {
            let mut name = String::with_capacity(rest.len() + 1);
            name.push(first);
            name.push_str(&rest);
            name
        })
}

fn multiplier<'a>() -> impl Parser<'a, &'a str, Multiplier, ParserErr<'a>> + Clone {
    choice((just('*').to(OpSign::Mul), just('/').to(OpSign::Div)))
        .then(number())
        .map(|(op, number)| Multiplier { op, number })
}

fn percentage<'a>() -> impl Parser<'a, &'a str, Percentage, ParserErr<'a>> + Clone {
    number()
        .then_ignore(just('%'))
        .then(deltanumber().or_not())
        .map(|(number, constant)| Percentage { number, constant })
}

fn view_predicate<'a>() -> impl Parser<'a, &'a str, ViewPredicate, ParserErr<'a>> + Clone {
    // A bare `-` names the enclosing spacer, but `-.centerX`/`-.centerY`
    // stay unparseable: a spacer has no center to constrain.
    let name = choice((
        just('-')
            .and_is(just("-.center").not())
            .to(String::from("-")),
        just('^').to(String::from("^")),
        identifier(),
    ));

    name.then(attribute().or_not())
        .then(multiplier().or_not())
        .then(deltanumber().or_not())
        .map(
            |(((view_name, attribute), multiplier), constant)| ViewPredicate {
                view_name,
                attribute,
                multiplier,
                constant,
            },
        )
}

// Percentage before constant: both start with a number, `%` disambiguates.
fn predicate<'a>() -> impl Parser<'a, &'a str, Predicate, ParserErr<'a>> + Clone {
    relation()
        .or_not()
        .then(choice((
            percentage().map(PredicateObject::Percentage),
            number().map(PredicateObject::Constant),
            view_predicate().map(PredicateObject::View),
        )))
        .then(priority().or_not())
        .map(|((relation, object), priority)| Predicate {
            relation,
            object,
            priority,
        })
}

fn predicate_paren_list<'a>() -> impl Parser<'a, &'a str, Vec<Predicate>, ParserErr<'a>> + Clone {
    predicate()
        .separated_by(just(','))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just('('), just(')'))
}

fn predicate_list<'a>() -> impl Parser<'a, &'a str, PredicateList, ParserErr<'a>> + Clone {
    choice((
        priority().map(PredicateList::Priority),
        percentage().map(PredicateList::Percentage),
        number().map(PredicateList::Constant),
        predicate_paren_list().map(PredicateList::List),
    ))
}

// `->` must be tried before `-`: the hyphen alternative would otherwise
// commit on the first character and strand the `>`.
fn connection<'a>() -> impl Parser<'a, &'a str, Connection, ParserErr<'a>> + Clone {
    choice((
        just("->").to(Connection {
            predicates: None,
            connector: Connector::Arrow,
        }),
        just('-')
            .ignore_then(predicate_list().then_ignore(just('-')).or_not())
            .map(|predicates| Connection {
                predicates,
                connector: Connector::Hyphen,
            }),
        just('~')
            .ignore_then(predicate_list().then_ignore(just('~')).or_not())
            .map(|predicates| Connection {
                predicates,
                connector: Connector::Tilde,
            }),
        empty().to(Connection {
            predicates: None,
            connector: Connector::Closed,
        }),
    ))
}

fn view_group<'a>() -> impl Parser<'a, &'a str, ViewGroup, ParserErr<'a>> + Clone {
    recursive(|view_group| {
        let pair = connection()
            .then(view_group)
            .map(|(connection, views)| ConnectionViewGroupPair { connection, views });

        let cascade = just(':')
            .ignore_then(pair.repeated().at_least(1).collect::<Vec<_>>())
            .then(connection())
            .map(|(rest, to_super)| CascadedViews { rest, to_super });

        let view = identifier()
            .then(predicate_paren_list().or_not())
            .then(cascade.or_not())
            .map(|((name, predicates), cascade)| View {
                name,
                predicates: predicates.unwrap_or_default(),
                cascade,
            });

        view.separated_by(just(','))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just('['), just(']'))
    })
}

fn visual_format<'a>() -> impl Parser<'a, &'a str, VisualFormat, ParserErr<'a>> + Clone {
    let pair = connection()
        .then(view_group())
        .map(|(connection, views)| ConnectionViewGroupPair { connection, views });

    just('|')
        .or_not()
        .then(pair.repeated().at_least(1).collect::<Vec<_>>())
        .then(connection())
        .then(just('|').or_not())
        .map(|(((leading, rest), trailing), closing)| VisualFormat {
            attach_leading: leading.is_some(),
            rest,
            trailing,
            attach_trailing: closing.is_some(),
        })
}

fn constraint_format<'a>() -> impl Parser<'a, &'a str, ConstraintFormat, ParserErr<'a>> + Clone {
    let names = choice((
        identifier().map(|name| vec![name]),
        identifier()
            .separated_by(just(','))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just('['), just(']')),
    ));

    let attribute_block = attribute()
        .then(predicate_paren_list())
        .map(|(attribute, predicates)| AttributePredicate {
            attribute,
            predicates,
        });

    names
        .then(attribute_block.repeated().at_least(1).collect::<Vec<_>>())
        .map(|(views, predicates)| ConstraintFormat { views, predicates })
}

fn document<'a>() -> impl Parser<'a, &'a str, Document, ParserErr<'a>> {
    // Formats inside a row are separated by literal spaces only; rows by any
    // run of `; \n\r\t ` including the empty run, so rows may abut directly.
    let spaces = || just(' ').repeated().at_least(1);
    let row_break = || one_of("; \n\r\t").repeated();

    let constraint_row = just("C:")
        .ignore_then(
            constraint_format()
                .separated_by(spaces())
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .map(FormatRow::Constraint);

    let visual_row = orientation()
        .then(
            visual_format()
                .separated_by(spaces())
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .map(|(orientation, items)| FormatRow::Visual { orientation, items });

    // `C:` first: `C` would otherwise never be mistaken for an orientation,
    // but keeping the reference order costs nothing.
    let row = choice((constraint_row, visual_row));

    row.separated_by(row_break())
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(row_break(), row_break())
        .then_ignore(end())
        .map(|rows| Document { rows })
}
