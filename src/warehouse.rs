use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use tracing::debug;

use crate::{
    error::LoadError,
    model::{FundamentalsRow, NewsRow, NewsTickerRow, PortfolioRow, PriceRow},
    schema::TableKind,
};

/// A `catalog.schema` pair the data room lives under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub catalog: String,
    pub schema: String,
}

impl Namespace {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }

    pub fn qualify(&self, table: &str) -> String {
        format!("{}.{}.{table}", self.catalog, self.schema)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// Typed storage for one table.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    Portfolio(Vec<PortfolioRow>),
    Fundamentals(Vec<FundamentalsRow>),
    Prices(Vec<PriceRow>),
    NewsTicker(Vec<NewsTickerRow>),
    News(Vec<NewsRow>),
}

impl Rows {
    pub fn empty(kind: TableKind) -> Self {
        match kind {
            TableKind::Portfolio => Rows::Portfolio(Vec::new()),
            TableKind::Fundamentals => Rows::Fundamentals(Vec::new()),
            TableKind::Prices => Rows::Prices(Vec::new()),
            TableKind::NewsTicker => Rows::NewsTicker(Vec::new()),
            TableKind::News => Rows::News(Vec::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Rows::Portfolio(rows) => rows.len(),
            Rows::Fundamentals(rows) => rows.len(),
            Rows::Prices(rows) => rows.len(),
            Rows::NewsTicker(rows) => rows.len(),
            Rows::News(rows) => rows.len(),
        }
    }
}

/// Ties a row type to the table that stores it.
pub trait TableRow: Sized {
    const KIND: TableKind;

    fn rows(rows: &Rows) -> Option<&Vec<Self>>;
    fn rows_mut(rows: &mut Rows) -> Option<&mut Vec<Self>>;
}

macro_rules! table_row {
    ($row:ty, $variant:ident) => {
        impl TableRow for $row {
            const KIND: TableKind = TableKind::$variant;

            fn rows(rows: &Rows) -> Option<&Vec<Self>> {
                match rows {
                    Rows::$variant(rows) => Some(rows),
                    _ => None,
                }
            }

            fn rows_mut(rows: &mut Rows) -> Option<&mut Vec<Self>> {
                match rows {
                    Rows::$variant(rows) => Some(rows),
                    _ => None,
                }
            }
        }
    };
}

table_row!(PortfolioRow, Portfolio);
table_row!(FundamentalsRow, Fundamentals);
table_row!(PriceRow, Prices);
table_row!(NewsTickerRow, NewsTicker);
table_row!(NewsRow, News);

#[derive(Default, Debug, Clone)]
struct Database {
    tables: BTreeMap<TableKind, Rows>,
}

/// In-process warehouse: catalogs own schemas, schemas own tables.
#[derive(Default, Debug, Clone)]
pub struct Warehouse {
    catalogs: BTreeSet<String>,
    databases: BTreeMap<Namespace, Database>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_catalog_if_not_exists(&mut self, catalog: &str) {
        if self.catalogs.insert(catalog.to_owned()) {
            debug!(catalog, "created catalog");
        }
    }

    pub fn create_schema_if_not_exists(&mut self, namespace: &Namespace) -> eyre::Result<()> {
        if !self.catalogs.contains(&namespace.catalog) {
            return Err(LoadError::Config(format!(
                "catalog `{}` does not exist",
                namespace.catalog
            ))
            .into());
        }

        if !self.databases.contains_key(namespace) {
            debug!(%namespace, "created schema");
            self.databases.insert(namespace.clone(), Database::default());
        }

        Ok(())
    }

    /// Drops `kind` if it exists and recreates it without rows.
    pub fn create_or_replace_table(
        &mut self,
        namespace: &Namespace,
        kind: TableKind,
    ) -> eyre::Result<()> {
        let database = self.database_mut(namespace)?;
        let replaced = database
            .tables
            .insert(kind, Rows::empty(kind))
            .is_some();

        debug!(table = %namespace.qualify(kind.name()), replaced, "created table");
        Ok(())
    }

    /// Appends `rows` and returns the number of affected rows.
    pub fn insert_into<R: TableRow>(
        &mut self,
        namespace: &Namespace,
        rows: Vec<R>,
    ) -> eyre::Result<usize> {
        let table = self.table_mut(namespace, R::KIND)?;
        let target = R::rows_mut(table)
            .ok_or_else(|| LoadError::MissingTable(namespace.qualify(R::KIND.name())))?;

        let affected = rows.len();
        target.extend(rows);

        Ok(affected)
    }

    pub fn scan<R: TableRow>(&self, namespace: &Namespace) -> eyre::Result<&[R]> {
        let table = self.table(namespace, R::KIND)?;
        let rows = R::rows(table)
            .ok_or_else(|| LoadError::MissingTable(namespace.qualify(R::KIND.name())))?;

        Ok(rows.as_slice())
    }

    pub fn table(&self, namespace: &Namespace, kind: TableKind) -> eyre::Result<&Rows> {
        let database = self
            .databases
            .get(namespace)
            .ok_or_else(|| LoadError::MissingNamespace(namespace.to_string()))?;

        Ok(database
            .tables
            .get(&kind)
            .ok_or_else(|| LoadError::MissingTable(namespace.qualify(kind.name())))?)
    }

    pub fn row_count(&self, namespace: &Namespace, kind: TableKind) -> eyre::Result<usize> {
        Ok(self.table(namespace, kind)?.len())
    }

    pub fn table_names(&self, namespace: &Namespace) -> eyre::Result<Vec<&'static str>> {
        let database = self
            .databases
            .get(namespace)
            .ok_or_else(|| LoadError::MissingNamespace(namespace.to_string()))?;

        Ok(database.tables.keys().map(|k| k.name()).collect())
    }

    fn database_mut(&mut self, namespace: &Namespace) -> eyre::Result<&mut Database> {
        Ok(self
            .databases
            .get_mut(namespace)
            .ok_or_else(|| LoadError::MissingNamespace(namespace.to_string()))?)
    }

    fn table_mut(&mut self, namespace: &Namespace, kind: TableKind) -> eyre::Result<&mut Rows> {
        let qualified = namespace.qualify(kind.name());

        Ok(self
            .database_mut(namespace)?
            .tables
            .get_mut(&kind)
            .ok_or(LoadError::MissingTable(qualified))?)
    }
}
