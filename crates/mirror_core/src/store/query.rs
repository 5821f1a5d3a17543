//! Fetch descriptors, predicates and sort keys.
//!
//! Predicates and sort keys are closures evaluated in-process; stores load
//! the entity family and then call [`FetchDescriptor::apply`].

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Named record filter.
///
/// The label is what appears in logs and store journals; the closure is
/// never printed.
pub struct Predicate<R> {
    label: String,
    test: Arc<dyn Fn(&R) -> bool + Send + Sync>,
}

impl<R> Predicate<R> {
    pub fn new(label: impl Into<String>, test: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, record: &R) -> bool {
        (self.test)(record)
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<R> Debug for Predicate<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One ordering criterion of a fetch descriptor.
pub struct SortKey<R> {
    label: String,
    order: SortOrder,
    compare: Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>,
}

impl<R: 'static> SortKey<R> {
    pub fn ascending<K: Ord + 'static>(
        label: impl Into<String>,
        key: impl Fn(&R) -> K + Send + Sync + 'static,
    ) -> Self {
        Self::by_key(label, SortOrder::Ascending, key)
    }

    pub fn descending<K: Ord + 'static>(
        label: impl Into<String>,
        key: impl Fn(&R) -> K + Send + Sync + 'static,
    ) -> Self {
        Self::by_key(label, SortOrder::Descending, key)
    }

    fn by_key<K: Ord + 'static>(
        label: impl Into<String>,
        order: SortOrder,
        key: impl Fn(&R) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            order,
            compare: Arc::new(move |left: &R, right: &R| key(left).cmp(&key(right))),
        }
    }
}

impl<R> SortKey<R> {

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    fn compare(&self, left: &R, right: &R) -> Ordering {
        let ordering = (self.compare)(left, right);
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl<R> Clone for SortKey<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            order: self.order,
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<R> Debug for SortKey<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortKey")
            .field("label", &self.label)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Opaque filter/sort specification passed through to `StoreContext::fetch`.
///
/// The default descriptor is unfiltered, unsorted and unbounded.
pub struct FetchDescriptor<R> {
    pub predicate: Option<Predicate<R>>,
    pub sort: Vec<SortKey<R>>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl<R> Default for FetchDescriptor<R> {
    fn default() -> Self {
        Self {
            predicate: None,
            sort: Vec::new(),
            limit: None,
            offset: 0,
        }
    }
}

impl<R> Clone for FetchDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            sort: self.sort.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<R> Debug for FetchDescriptor<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchDescriptor")
            .field("predicate", &self.predicate)
            .field("sort", &self.sort)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<R> FetchDescriptor<R> {
    pub fn filtered(predicate: Predicate<R>) -> Self {
        Self {
            predicate: Some(predicate),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, key: SortKey<R>) -> Self {
        self.sort.push(key);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Short description for log lines: `predicate=<label> sort=<n>`.
    pub fn summary(&self) -> String {
        format!(
            "predicate={} sort={} limit={} offset={}",
            self.predicate.as_ref().map_or("all", |p| p.label()),
            self.sort.len(),
            self.limit
                .map_or_else(|| "none".to_string(), |limit| limit.to_string()),
            self.offset
        )
    }

    /// Filters, sorts and pages `records` in store order.
    ///
    /// Sorting is stable, so records comparing equal keep store order.
    pub fn apply(&self, records: Vec<R>) -> Vec<R> {
        let mut matched: Vec<R> = match &self.predicate {
            Some(predicate) => records
                .into_iter()
                .filter(|record| predicate.matches(record))
                .collect(),
            None => records,
        };

        if !self.sort.is_empty() {
            matched.sort_by(|left, right| {
                self.sort
                    .iter()
                    .map(|key| key.compare(left, right))
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let paged = matched.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        }
    }
}
