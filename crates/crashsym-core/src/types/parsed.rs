//! Outcome of a per-line parser.

/// Result of matching one report line against a line kind.
///
/// Crash reports mix many kinds of lines and most of them are not the kind a
/// given parser looks for, so a miss is `Skipped` rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T>
{
    /// The line had the expected shape.
    Parsed(T),
    /// The line is some other kind and should be left alone.
    Skipped,
}

impl<T> Parsed<T>
{
    /// Convert into an `Option`, dropping the distinction between skip reasons.
    pub fn ok(self) -> Option<T>
    {
        match self {
            Parsed::Parsed(value) => Some(value),
            Parsed::Skipped => None,
        }
    }

    /// Borrow the parsed value, if any.
    pub fn as_ref(&self) -> Parsed<&T>
    {
        match self {
            Parsed::Parsed(value) => Parsed::Parsed(value),
            Parsed::Skipped => Parsed::Skipped,
        }
    }

    pub fn is_parsed(&self) -> bool
    {
        matches!(self, Parsed::Parsed(_))
    }
}

impl<T> From<Option<T>> for Parsed<T>
{
    fn from(value: Option<T>) -> Self
    {
        value.map_or(Parsed::Skipped, Parsed::Parsed)
    }
}
