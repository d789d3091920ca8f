#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a built-in [`TagHandler`](crate::tags::TagHandler) table entry.
///
/// ```ignore
/// tag! { name: "srai", flags: TagFlags::RECURSIVE | TagFlags::REDIRECT, eval: redirect::srai }
/// ```
#[macro_export]
macro_rules! tag {
    (
        name: $name:expr,
        flags: $flags:expr,
        eval: $eval:expr
        $(,)?
    ) => {{
        $crate::tags::TagHandler { name: $name.to_string(), flags: $flags, eval: Box::new($eval) }
    }};
}
