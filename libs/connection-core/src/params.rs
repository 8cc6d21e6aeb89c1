use std::fmt;

/// Comparison applied by a [`Filter`].
///
/// The set is open-ended: the server owns validation, so [`FilterOperator::Custom`]
/// forwards any operator name unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    Custom(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "nin",
            FilterOperator::Like => "like",
            FilterOperator::Custom(op) => op.as_str(),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FilterOperator {
    fn from(s: &str) -> Self {
        match s {
            "eq" => FilterOperator::Eq,
            "ne" => FilterOperator::Ne,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "in" => FilterOperator::In,
            "nin" => FilterOperator::NotIn,
            "like" => FilterOperator::Like,
            other => FilterOperator::Custom(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub property: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl Filter {
    /// Renders `<property>:<operator>=<v1>,<v2>,...`
    fn encode_into(&self, out: &mut String) {
        out.push_str(&urlencoding::encode(&self.property));
        out.push(':');
        out.push_str(&urlencoding::encode(self.operator.as_str()));
        out.push('=');
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&urlencoding::encode(value));
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub descending: bool,
}

impl Sort {
    fn encode_into(&self, out: &mut String) {
        out.push_str("sort=");
        if self.descending {
            out.push('-');
        }
        out.push_str(&urlencoding::encode(&self.property));
    }
}

/// Filtering, sorting and pagination controls of a list request.
///
/// Values are immutable in spirit: the builder methods consume and return
/// `self`, and [`RequestParameters::with_page`] produces a copy for the next
/// page. Filters and sorts keep their insertion order, which is also the order
/// they appear in the encoded query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParameters {
    filters: Vec<Filter>,
    sorts: Vec<Sort>,
    page: Option<u32>,
    per_page: u32,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Filters on the same property are kept as separate entries.
    pub fn filter<I, V>(
        mut self,
        property: impl Into<String>,
        operator: impl Into<FilterOperator>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.filters.push(Filter {
            property: property.into(),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn sort(mut self, property: impl Into<String>) -> Self {
        self.sorts.push(Sort {
            property: property.into(),
            descending: false,
        });
        self
    }

    pub fn sort_desc(mut self, property: impl Into<String>) -> Self {
        self.sorts.push(Sort {
            property: property.into(),
            descending: true,
        });
        self
    }

    /// Request a specific page. Pages are 1-based; 0 is clamped to 1.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page.max(1));
        self
    }

    /// Page size; 0 leaves the choice to the server.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Copy of these parameters pointing at `page`.
    pub fn with_page(&self, page: u32) -> Self {
        self.clone().page(page)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Requested page, if one was set explicitly.
    pub fn requested_page(&self) -> Option<u32> {
        self.page
    }

    /// Requested page, defaulting to the first one.
    pub fn page_number(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.per_page
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sorts.is_empty()
            && self.page.is_none()
            && self.per_page == 0
    }

    /// Serialize to query-string form, without a leading `?`.
    ///
    /// Layout: filters, then sorts, then `page` and `per_page`, joined by `&`.
    #[must_use]
    pub fn encode(&self) -> String {
        fn sep(out: &mut String) {
            if !out.is_empty() {
                out.push('&');
            }
        }

        let mut out = String::new();

        for filter in &self.filters {
            sep(&mut out);
            filter.encode_into(&mut out);
        }
        for sort in &self.sorts {
            sep(&mut out);
            sort.encode_into(&mut out);
        }
        if let Some(page) = self.page {
            sep(&mut out);
            out.push_str("page=");
            out.push_str(&page.to_string());
        }
        if self.per_page > 0 {
            sep(&mut out);
            out.push_str("per_page=");
            out.push_str(&self.per_page.to_string());
        }
        out
    }
}

impl fmt::Display for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
