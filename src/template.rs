/// Output templates with `%n`, `%l` and `%p` placeholders.
///
/// The template is split into segments once and rendered in a single pass per
/// record, so a password containing `%n` is printed verbatim rather than
/// expanded. Any other `%` sequence, including a trailing `%`, is literal.
use crate::proxy::LoginRecord;

/// Default template: one labelled line per field.
pub const DEFAULT_TEMPLATE: &str = "Name: %n\nLogin: %l\nPassword: %p\n";

/// Rendered in place of a field the password manager did not return.
pub const MISSING: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Login,
    Password,
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Split `source` into literal text and placeholders.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let placeholder = match (c, chars.peek()) {
                ('%', Some('n')) => Some(Segment::Name),
                ('%', Some('l')) => Some(Segment::Login),
                ('%', Some('p')) => Some(Segment::Password),
                _ => None,
            };
            match placeholder {
                Some(segment) => {
                    chars.next();
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                None => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Substitute every placeholder with the record's fields.
    #[must_use]
    pub fn render(&self, record: &LoginRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let text = match segment {
                Segment::Literal(s) => s.as_str(),
                Segment::Name => field(record.name.as_deref()),
                Segment::Login => field(record.login.as_deref()),
                Segment::Password => field(record.password.as_deref()),
            };
            out.push_str(text);
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE)
    }
}

fn field(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING)
}
