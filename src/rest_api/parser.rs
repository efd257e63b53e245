//! # Query Parameter Parser
//!
//! Classifies raw query parameters against a store's field set and builds
//! the structured query descriptions from them.
//!
//! | Parameter | Meaning |
//! |-----------|---------|
//! | `include=a,b` | projection |
//! | `sort=-a,b` | sort spec, `-` marks descending |
//! | `max=N`, `offset=N` | pagination |
//! | `<field>:=v` | update `<field>` to `v` |
//! | `<field>=v1,v2` | pattern filter on `<field>` |
//!
//! Anything else, including unknown fields, is ignored.

use crate::store::{FieldSet, Page, PatternFilter, Projection, SortSpec, UpdateMap};

use super::errors::{RestError, RestResult};

pub const INCLUDE_PARAM: &str = "include";
pub const SORT_PARAM: &str = "sort";
pub const MAX_PARAM: &str = "max";
pub const OFFSET_PARAM: &str = "offset";

/// Suffix marking a parameter as an update assignment
pub const UPDATE_SUFFIX: char = ':';

/// Marks a sort token as descending
const DESCENDING_PREFIX: char = '-';

/// Reserved parameter names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedParam {
    Include,
    Sort,
    Max,
    Offset,
}

impl ReservedParam {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            INCLUDE_PARAM => Some(ReservedParam::Include),
            SORT_PARAM => Some(ReservedParam::Sort),
            MAX_PARAM => Some(ReservedParam::Max),
            OFFSET_PARAM => Some(ReservedParam::Offset),
            _ => None,
        }
    }
}

/// Category of one query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass<'a> {
    Reserved(ReservedParam),
    /// Update of the named field (suffix already stripped)
    Update(&'a str),
    /// Pattern filter on the named field
    Pattern(&'a str),
    Ignored,
}

/// Classify a parameter name; reserved names win over field names
pub fn classify<'a>(name: &'a str, fields: &FieldSet) -> ParamClass<'a> {
    if let Some(reserved) = ReservedParam::from_name(name) {
        return ParamClass::Reserved(reserved);
    }

    if let Some(field) = name.strip_suffix(UPDATE_SUFFIX) {
        return if fields.contains(field) {
            ParamClass::Update(field)
        } else {
            ParamClass::Ignored
        };
    }

    if fields.contains(name) {
        ParamClass::Pattern(name)
    } else {
        ParamClass::Ignored
    }
}

/// Query parameters partitioned by category, in arrival order
#[derive(Debug, Clone, Default)]
pub struct ClassifiedParams<'a> {
    reserved: Vec<(ReservedParam, &'a str)>,
    updates: Vec<(&'a str, &'a str)>,
    patterns: Vec<(&'a str, &'a str)>,
    ignored: Vec<&'a str>,
}

impl<'a> ClassifiedParams<'a> {
    /// Partition raw parameters against a field set
    pub fn classify(params: &'a [(String, String)], fields: &FieldSet) -> Self {
        let mut classified = Self::default();

        for (name, value) in params {
            let value = value.as_str();
            match classify(name, fields) {
                ParamClass::Reserved(reserved) => classified.reserved.push((reserved, value)),
                ParamClass::Update(field) => classified.updates.push((field, value)),
                ParamClass::Pattern(field) => classified.patterns.push((field, value)),
                ParamClass::Ignored => classified.ignored.push(name.as_str()),
            }
        }

        classified
    }

    /// Names of parameters that were dropped
    pub fn ignored(&self) -> &[&'a str] {
        &self.ignored
    }

    fn reserved(&self, wanted: ReservedParam) -> impl Iterator<Item = &'a str> + '_ {
        self.reserved
            .iter()
            .filter(move |(param, _)| *param == wanted)
            .map(|(_, value)| *value)
    }

    /// Field -> accepted literals; repeated parameters accumulate
    pub fn pattern_filter(&self) -> PatternFilter {
        let mut filter = PatternFilter::new();
        for (field, value) in &self.patterns {
            filter.extend(*field, split_list(value));
        }
        filter
    }

    /// Field -> literal assignments; repeated parameters keep the last value
    pub fn update_map(&self) -> UpdateMap {
        let mut update = UpdateMap::new();
        for (field, value) in &self.updates {
            update.set(*field, *value);
        }
        update
    }

    /// Projection from `include`
    pub fn projection(&self) -> Projection {
        Projection::new(
            self.reserved(ReservedParam::Include)
                .flat_map(split_list)
                .filter(|field| !field.is_empty()),
        )
    }

    /// Sort spec from `sort`, in declared order
    pub fn sort_spec(&self) -> SortSpec {
        let mut sort = SortSpec::new();
        for token in self.reserved(ReservedParam::Sort).flat_map(split_list) {
            if let Some((field, descending)) = parse_sort_token(&token) {
                sort.push(field, descending);
            }
        }
        sort
    }

    /// Pagination from `max` and `offset`; the last occurrence wins
    pub fn page(&self) -> RestResult<Page> {
        let max = self.reserved(ReservedParam::Max).last();
        let offset = self.reserved(ReservedParam::Offset).last();

        Ok(Page {
            max: max.map(|v| parse_int(MAX_PARAM, v)).transpose()?,
            offset: offset.map(|v| parse_int(OFFSET_PARAM, v)).transpose()?,
        })
    }
}

/// Split on commas, trim each token, and drop trailing empty tokens
///
/// Interior empty tokens are kept; commas cannot be escaped.
pub fn split_list(value: &str) -> Vec<String> {
    let mut tokens: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
    while tokens.last().is_some_and(|s| s.is_empty()) {
        tokens.pop();
    }
    tokens
}

/// Parse a sort token into (field, descending)
pub fn parse_sort_token(token: &str) -> Option<(&str, bool)> {
    let (field, descending) = match token.strip_prefix(DESCENDING_PREFIX) {
        Some(rest) => (rest, true),
        None => (token, false),
    };

    if field.is_empty() {
        None
    } else {
        Some((field, descending))
    }
}

/// Strict integer parse; pagination bounds must not be negative
fn parse_int(name: &str, value: &str) -> RestResult<u64> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| RestError::InvalidQueryParam(format!("Invalid {}: {}", name, value)))?;
    u64::try_from(parsed).map_err(|_| {
        RestError::InvalidQueryParam(format!("Invalid {}: {} is negative", name, value))
    })
}
