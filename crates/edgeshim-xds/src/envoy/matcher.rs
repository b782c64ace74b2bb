//! `envoy.type.matcher.v3` and `envoy.type.v3`: value matchers

/// A regex matcher designed for safety when used with untrusted input.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegexMatcher {
    /// The regex match string. The string must be supported by the configured engine.
    #[prost(string, tag = "2")]
    pub regex: ::prost::alloc::string::String,
}
/// Specifies the int64 start and end of the range using half-open interval semantics [start,
/// end).
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Int64Range {
    /// start of the range (inclusive)
    #[prost(int64, tag = "1")]
    pub start: i64,
    /// end of the range (exclusive)
    #[prost(int64, tag = "2")]
    pub end: i64,
}

/// Specifies the way to match a string.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMatcher {
    /// If true, indicates the exact/prefix/suffix/contains matching should be case insensitive.
    #[prost(bool, tag = "6")]
    pub ignore_case: bool,
    #[prost(oneof = "string_matcher::MatchPattern", tags = "1, 2, 3, 5, 7")]
    pub match_pattern: ::core::option::Option<string_matcher::MatchPattern>,
}
/// Nested message and enum types in `StringMatcher`.
pub mod string_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        /// The input string must match exactly the string specified here.
        #[prost(string, tag = "1")]
        Exact(::prost::alloc::string::String),
        /// The input string must have the prefix specified here.
        #[prost(string, tag = "2")]
        Prefix(::prost::alloc::string::String),
        /// The input string must have the suffix specified here.
        #[prost(string, tag = "3")]
        Suffix(::prost::alloc::string::String),
        /// The input string must match the regular expression specified here.
        #[prost(message, tag = "5")]
        SafeRegex(super::RegexMatcher),
        /// The input string must have the substring specified here.
        #[prost(string, tag = "7")]
        Contains(::prost::alloc::string::String),
    }
}

impl StringMatcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(string_matcher::MatchPattern::Exact(value.into())),
            ..Default::default()
        }
    }

    pub fn get_exact(&self) -> &str {
        match &self.match_pattern {
            Some(string_matcher::MatchPattern::Exact(value)) => value,
            _ => "",
        }
    }
}

impl RegexMatcher {
    pub fn new(regex: impl Into<String>) -> Self {
        Self { regex: regex.into() }
    }
}
