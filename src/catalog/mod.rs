//! Function catalog: which functions exist, their category, and the SQL each
//! engine runs to exercise them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::engine::EngineId;
use crate::error::ConfigError;

pub mod builtin;

/// Placeholder substituted with the engine's table reference.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// Function category. Declaration order is the catalog's primary sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    String,
    Math,
    Trig,
    Datetime,
    Conditional,
    Hash,
    Regex,
    Array,
    AggUngrouped,
    AggGrouped,
    Window,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::String,
        Category::Math,
        Category::Trig,
        Category::Datetime,
        Category::Conditional,
        Category::Hash,
        Category::Regex,
        Category::Array,
        Category::AggUngrouped,
        Category::AggGrouped,
        Category::Window,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::String => "string",
            Category::Math => "math",
            Category::Trig => "trig",
            Category::Datetime => "datetime",
            Category::Conditional => "conditional",
            Category::Hash => "hash",
            Category::Regex => "regex",
            Category::Array => "array",
            Category::AggUngrouped => "agg_ungrouped",
            Category::AggGrouped => "agg_grouped",
            Category::Window => "window",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

/// One benchmarked function and its per-engine query templates.
///
/// An engine without an entry does not support the function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub category: Category,
    pub description: String,
    queries: BTreeMap<EngineId, String>,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description: description.into(),
            queries: BTreeMap::new(),
        }
    }

    pub fn with_query(mut self, engine: EngineId, template: impl Into<String>) -> Self {
        self.queries.insert(engine, template.into());
        self
    }

    /// Raw template, still containing [`TABLE_PLACEHOLDER`].
    pub fn query_for(&self, engine: EngineId) -> Option<&str> {
        self.queries.get(&engine).map(String::as_str)
    }

    /// Template with the table placeholder filled in.
    pub fn render_query(&self, engine: EngineId, table_ref: &str) -> Option<String> {
        self.query_for(engine)
            .map(|t| t.replace(TABLE_PLACEHOLDER, table_ref))
    }

    pub fn supports(&self, engine: EngineId) -> bool {
        self.queries.contains_key(&engine)
    }

    pub fn engines(&self) -> impl Iterator<Item = EngineId> + '_ {
        self.queries.keys().copied()
    }
}

/// Immutable, sorted registry of [`FunctionSpec`]s.
#[derive(Clone, Debug)]
pub struct Catalog {
    functions: Vec<FunctionSpec>,
}

impl Catalog {
    /// Builds a catalog sorted by category then name.
    pub fn new(mut functions: Vec<FunctionSpec>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for f in &functions {
            if !seen.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateFunction(f.name.clone()));
            }
            if f.queries.is_empty() {
                return Err(ConfigError::EmptyFunction {
                    function: f.name.clone(),
                    category: f.category,
                });
            }
        }
        functions.sort_by(|a, b| (a.category, &a.name).cmp(&(b.category, &b.name)));
        Ok(Self { functions })
    }

    pub fn builtin() -> Self {
        Self {
            functions: builtin::functions(),
        }
        .sorted()
    }

    fn sorted(mut self) -> Self {
        self.functions
            .sort_by(|a, b| (a.category, &a.name).cmp(&(b.category, &b.name)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.iter()
    }

    /// Functions selected by `filter`, in catalog order.
    ///
    /// Every allow-listed name must exist in the catalog.
    pub fn lookup(&self, filter: &CatalogFilter) -> Result<Vec<&FunctionSpec>, ConfigError> {
        if let Some(include) = &filter.include {
            if let Some(missing) = include.iter().find(|n| self.get(n).is_none()) {
                return Err(ConfigError::UnknownFunction(missing.clone()));
            }
        }
        for name in filter.exclude.iter().filter(|n| self.get(n).is_none()) {
            warn!(function = %name, "exclude list names a function that is not in the catalog");
        }
        Ok(filter.select(&self.functions))
    }
}

/// Selection over a catalog.
///
/// The allow-list (intersected with any category restriction) is applied
/// first; the deny-list is always subtracted last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub categories: Option<BTreeSet<Category>>,
    pub include: Option<BTreeSet<String>>,
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl CatalogFilter {
    /// Parses raw lists; empty category or include lists mean "no restriction".
    pub fn from_lists(
        categories: &[String],
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, ConfigError> {
        let categories = if categories.is_empty() {
            None
        } else {
            Some(
                categories
                    .iter()
                    .map(|c| c.parse())
                    .collect::<Result<BTreeSet<Category>, _>>()?,
            )
        };
        let include = (!include.is_empty()).then(|| include.iter().cloned().collect());
        Ok(Self {
            categories,
            include,
            exclude: exclude.iter().cloned().collect(),
        })
    }

    pub fn matches(&self, spec: &FunctionSpec) -> bool {
        if let Some(include) = &self.include {
            if !include.contains(&spec.name) {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&spec.category) {
                return false;
            }
        }
        !self.exclude.contains(&spec.name)
    }

    /// Order-preserving selection. Applying the same filter twice is a no-op.
    pub fn select<'a, I>(&self, specs: I) -> Vec<&'a FunctionSpec>
    where
        I: IntoIterator<Item = &'a FunctionSpec>,
    {
        specs.into_iter().filter(|s| self.matches(s)).collect()
    }

    /// Restricts this filter further: allow-lists and categories intersect,
    /// deny-lists union.
    pub fn narrow(self, other: CatalogFilter) -> CatalogFilter {
        fn intersect<T: Ord + Clone>(
            a: Option<BTreeSet<T>>,
            b: Option<BTreeSet<T>>,
        ) -> Option<BTreeSet<T>> {
            match (a, b) {
                (Some(a), Some(b)) => Some(a.intersection(&b).cloned().collect()),
                (a, None) => a,
                (None, b) => b,
            }
        }

        let mut exclude = self.exclude;
        exclude.extend(other.exclude);
        CatalogFilter {
            categories: intersect(self.categories, other.categories),
            include: intersect(self.include, other.include),
            exclude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, category: Category) -> FunctionSpec {
        FunctionSpec::new(name, category, name)
            .with_query(EngineId::DataFusion, format!("SELECT {name}(x) FROM {{table}}"))
    }

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            spec("upper", Category::String),
            spec("sin", Category::Trig),
            spec("abs", Category::Math),
            spec("lower", Category::String),
            spec("cos", Category::Trig),
        ])
        .unwrap()
    }

    fn names(specs: &[&FunctionSpec]) -> Vec<String> {
        specs.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_catalog_sorted_by_category_then_name() {
        let catalog = small_catalog();
        let all = catalog.lookup(&CatalogFilter::default()).unwrap();
        assert_eq!(names(&all), vec!["lower", "upper", "abs", "cos", "sin"]);
    }

    #[test]
    fn test_include_then_exclude() {
        let catalog = Catalog::new(vec![
            spec("a", Category::Math),
            spec("b", Category::Math),
            spec("c", Category::Math),
            spec("d", Category::Math),
        ])
        .unwrap();
        let filter = CatalogFilter::from_lists(
            &[],
            &["a".into(), "b".into(), "c".into()],
            &["b".into()],
        )
        .unwrap();
        assert_eq!(names(&catalog.lookup(&filter).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn test_include_intersects_categories() {
        let catalog = small_catalog();
        let filter = CatalogFilter::from_lists(
            &["trig".into()],
            &["sin".into(), "upper".into()],
            &[],
        )
        .unwrap();
        assert_eq!(names(&catalog.lookup(&filter).unwrap()), vec!["sin"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let catalog = small_catalog();
        let filter = CatalogFilter::from_lists(
            &["string".into(), "trig".into()],
            &[],
            &["cos".into()],
        )
        .unwrap();
        let once = filter.select(catalog.iter());
        let twice = filter.select(once.iter().copied());
        assert_eq!(once, twice);
        assert_eq!(names(&once), vec!["lower", "upper", "sin"]);
    }

    #[test]
    fn test_unknown_include_is_config_error() {
        let catalog = small_catalog();
        let filter = CatalogFilter::from_lists(&[], &["nope".into()], &[]).unwrap();
        assert!(matches!(
            catalog.lookup(&filter),
            Err(ConfigError::UnknownFunction(n)) if n == "nope"
        ));
    }

    #[test]
    fn test_unknown_category_is_config_error() {
        let err = CatalogFilter::from_lists(&["strings".into()], &[], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCategory(c) if c == "strings"));
    }

    #[test]
    fn test_unknown_exclude_is_ignored() {
        let catalog = small_catalog();
        let filter = CatalogFilter::from_lists(&[], &[], &["nope".into()]).unwrap();
        assert_eq!(catalog.lookup(&filter).unwrap().len(), 5);
    }

    #[test]
    fn test_narrow_intersects_and_unions() {
        let config = CatalogFilter::from_lists(
            &["string".into(), "math".into()],
            &["upper".into(), "abs".into()],
            &["lower".into()],
        )
        .unwrap();
        let cli = CatalogFilter::from_lists(&["math".into()], &[], &["sin".into()]).unwrap();
        let merged = config.narrow(cli);

        assert_eq!(merged.categories, Some(BTreeSet::from([Category::Math])));
        assert_eq!(
            merged.include,
            Some(BTreeSet::from(["upper".to_string(), "abs".to_string()]))
        );
        assert_eq!(
            merged.exclude,
            BTreeSet::from(["lower".to_string(), "sin".to_string()])
        );
        assert_eq!(names(&small_catalog().lookup(&merged).unwrap()), vec!["abs"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Catalog::new(vec![spec("x", Category::Math), spec("x", Category::Trig)])
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFunction(n) if n == "x"));
    }

    #[test]
    fn test_render_query_substitutes_table() {
        let s = spec("upper", Category::String);
        assert_eq!(
            s.render_query(EngineId::DataFusion, "'/data/t.parquet'").as_deref(),
            Some("SELECT upper(x) FROM '/data/t.parquet'")
        );
        assert_eq!(s.render_query(EngineId::DuckDb, "t"), None);
        assert!(!s.supports(EngineId::ClickHouse));
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }
}
