use std::borrow::Cow;

use crate::api::ParseOptions;
use crate::matcher::model::ArgumentDescriptor;
use crate::model::Mode;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Found(usize),
    /// The primary names of every candidate, in declaration order.
    Ambiguous(Vec<String>),
    NotFound,
}

/// Maps names (and unique name prefixes) to the index of what they name.
#[derive(Debug)]
pub(crate) struct Resolver {
    primaries: Vec<String>,
    names: Vec<(String, usize)>,
    shorts: Vec<(char, usize)>,
    case_sensitive: bool,
    auto_prefix: bool,
}

impl Resolver {
    pub(crate) fn new(primaries: Vec<String>, case_sensitive: bool, auto_prefix: bool) -> Self {
        Self {
            primaries,
            names: Vec::default(),
            shorts: Vec::default(),
            case_sensitive,
            auto_prefix,
        }
    }

    /// Index every name of every named descriptor.
    /// In [`Mode::Legacy`] the short names join the ordinary names as one character names.
    pub(crate) fn descriptors(descriptors: &[ArgumentDescriptor], options: &ParseOptions) -> Self {
        let mut resolver = Resolver::new(
            descriptors.iter().map(|d| d.name.clone()).collect(),
            options.is_case_sensitive(),
            options.prefix_matching(),
        );

        for (index, descriptor) in descriptors.iter().enumerate() {
            if !descriptor.named {
                continue;
            }

            for name in descriptor.all_names() {
                resolver.add_name(name, index);
            }

            for short in descriptor.all_shorts() {
                match options.syntax() {
                    Mode::LongShort => resolver.add_short(*short, index),
                    Mode::Legacy => resolver.add_name(&short.to_string(), index),
                }
            }
        }

        resolver
    }

    pub(crate) fn add_name(&mut self, name: &str, index: usize) {
        let folded = self.fold(name).into_owned();
        self.names.push((folded, index));
    }

    pub(crate) fn add_short(&mut self, short: char, index: usize) {
        self.shorts.push((short, index));
    }

    /// Exact matches win; otherwise a unique prefix (when enabled) resolves.
    pub(crate) fn resolve(&self, text: &str) -> Resolution {
        let folded = self.fold(text);

        if let Some((_, index)) = self.names.iter().find(|(name, _)| *name == folded) {
            return Resolution::Found(*index);
        }

        if !self.auto_prefix {
            return Resolution::NotFound;
        }

        let mut matched: Vec<usize> = self
            .names
            .iter()
            .filter(|(name, _)| name.starts_with(folded.as_ref()))
            .map(|(_, index)| *index)
            .collect();
        matched.sort_unstable();
        matched.dedup();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Prefix '{text}' matches {} candidate(s).", matched.len());
        }

        match matched.as_slice() {
            [] => Resolution::NotFound,
            [index] => Resolution::Found(*index),
            _ => Resolution::Ambiguous(
                matched
                    .into_iter()
                    .map(|index| self.primaries[index].clone())
                    .collect(),
            ),
        }
    }

    /// Short names only ever match exactly.
    pub(crate) fn resolve_short(&self, short: char) -> Option<usize> {
        self.shorts
            .iter()
            .find(|(s, _)| self.same_char(*s, short))
            .map(|(_, index)| *index)
    }

    fn fold<'s>(&self, text: &'s str) -> Cow<'s, str> {
        if self.case_sensitive {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.to_lowercase())
        }
    }

    fn same_char(&self, a: char, b: char) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.to_lowercase().eq(b.to_lowercase())
        }
    }
}
