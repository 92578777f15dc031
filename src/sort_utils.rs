/// Sort direction for table columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Trait for column enums. Each sortable table defines its own column enum
/// implementing this trait.
pub trait SortableColumn: Sized + Default + Clone + PartialEq {
    /// Parse column name from query string parameter.
    fn from_str(s: &str) -> Option<Self>;

    /// Convert column to query string parameter value.
    fn as_str(&self) -> &'static str;
}

/// Query parameters that carry a sort column and direction.
pub trait Sortable {
    fn sort_by(&self) -> Option<&String>;
    fn sort_dir(&self) -> Option<&String>;

    fn resolve_sort<C: SortableColumn>(&self) -> TableSort<C> {
        let column = self
            .sort_by()
            .and_then(|s| C::from_str(s))
            .unwrap_or_default();

        let direction = self
            .sort_dir()
            .map(|s| SortDirection::from_str(s))
            .unwrap_or_default();

        TableSort { column, direction }
    }
}

/// Sort configuration passed to templates.
#[derive(Debug, Clone)]
pub struct TableSort<C: SortableColumn> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: SortableColumn> TableSort<C> {
    pub fn is_active(&self, col: &C) -> bool {
        &self.column == col
    }

    /// Direction to use when clicking a column header: toggles the active
    /// column, starts other columns descending.
    pub fn next_direction_for(&self, col: &C) -> SortDirection {
        if self.is_active(col) {
            self.direction.toggle()
        } else {
            SortDirection::Desc
        }
    }

    /// Sort indicator for a column header ("▲", "▼", or "").
    pub fn indicator(&self, col: &C) -> &'static str {
        if self.is_active(col) {
            match self.direction {
                SortDirection::Asc => "▲",
                SortDirection::Desc => "▼",
            }
        } else {
            ""
        }
    }

    /// Indicator by column name, for templates.
    pub fn indicator_for(&self, col_name: &str) -> &'static str {
        C::from_str(col_name)
            .map(|col| self.indicator(&col))
            .unwrap_or("")
    }

    /// `(sort, dir)` parameters for sorting by a specific column.
    pub fn params_for(&self, col_name: &str) -> Option<(&'static str, &'static str)> {
        C::from_str(col_name).map(|col| (col.as_str(), self.next_direction_for(&col).as_str()))
    }
}

impl<C: SortableColumn> Default for TableSort<C> {
    fn default() -> Self {
        Self {
            column: C::default(),
            direction: SortDirection::default(),
        }
    }
}
