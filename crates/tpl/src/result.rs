//! Template results: the value objects produced by the tag macros.
//!
//! A result is `{kind, strings, values}`. The static fragments come from a
//! `static` slice materialized at the macro expansion site, so *strings
//! identity* (address + length) identifies the source literal: re-executing
//! the same call site yields the same identity, which is the compiled
//! template's cache key. The macros are pure constructors and do no parsing.

use crate::value::Value;

/// Markup flavor of a template result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    Html,
    Svg,
}

/// The static fragments of one template literal.
pub type Statics = &'static [&'static str];

/// Identity of a `Statics` slice, used as the template cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StringsKey {
    addr: usize,
    len: usize,
}

#[derive(Clone, Debug)]
pub struct TemplateResult {
    kind: TemplateKind,
    strings: Statics,
    values: Vec<Value>,
}

impl TemplateResult {
    pub fn new(kind: TemplateKind, strings: Statics, values: Vec<Value>) -> Self {
        assert_eq!(
            strings.len(),
            values.len() + 1,
            "template result shape: {} static fragments cannot carry {} values",
            strings.len(),
            values.len()
        );
        Self {
            kind,
            strings,
            values,
        }
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn strings(&self) -> Statics {
        self.strings
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn strings_key(&self) -> StringsKey {
        StringsKey {
            addr: self.strings.as_ptr() as usize,
            len: self.strings.len(),
        }
    }
}

/// Build an HTML [`TemplateResult`] from alternating string literals and
/// `{expr}` interpolations:
///
/// ```
/// use tpl::html;
/// let name = "world";
/// let greeting = html!("<p>hello " {name} "</p>");
/// assert_eq!(greeting.values().len(), 1);
/// ```
#[macro_export]
macro_rules! html {
    ($($tt:tt)*) => {
        $crate::__template_result!(@static_part $crate::TemplateKind::Html; []; []; $($tt)*)
    };
}

/// Build an SVG [`TemplateResult`]; the compiled fragment's contents carry
/// the SVG namespace.
#[macro_export]
macro_rules! svg {
    ($($tt:tt)*) => {
        $crate::__template_result!(@static_part $crate::TemplateKind::Svg; []; []; $($tt)*)
    };
}

/// Accumulator for [`html!`]/[`svg!`]. `@static_part` expects a static
/// fragment next (fragment and value counts are equal); `@value_part`
/// expects an interpolation (one more fragment than values). Empty fragments
/// are inserted wherever interpolations are adjacent or at the ends, so the
/// fragment count always ends at values + 1.
#[doc(hidden)]
#[macro_export]
macro_rules! __template_result {
    (@static_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*];) => {{
        static STRINGS: &[&str] = &[$($s,)* ""];
        $crate::TemplateResult::new($kind, STRINGS, ::std::vec![$($v,)*])
    }};
    (@static_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*]; $lit:literal $($rest:tt)*) => {
        $crate::__template_result!(@value_part $kind; [$($s,)* $lit,]; [$($v,)*]; $($rest)*)
    };
    (@static_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*]; { $val:expr } $($rest:tt)*) => {
        $crate::__template_result!(
            @static_part $kind;
            [$($s,)* "",];
            [$($v,)* $crate::Value::from($val),];
            $($rest)*
        )
    };
    (@value_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*];) => {{
        static STRINGS: &[&str] = &[$($s,)*];
        $crate::TemplateResult::new($kind, STRINGS, ::std::vec![$($v,)*])
    }};
    (@value_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*]; { $val:expr } $($rest:tt)*) => {
        $crate::__template_result!(
            @static_part $kind;
            [$($s,)*];
            [$($v,)* $crate::Value::from($val),];
            $($rest)*
        )
    };
    (@value_part $kind:expr; [$($s:expr,)*]; [$($v:expr,)*]; $lit:literal $($rest:tt)*) => {
        ::core::compile_error!(
            "adjacent string fragments; join them into one literal"
        )
    };
}
