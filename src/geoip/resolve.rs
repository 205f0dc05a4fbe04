//! Range resolution.
//!
//! Fetches the ranges covering a key from a `RangeSource` and picks the one
//! to report. Sources make no ordering promise, so the selection rule lives
//! here and is the same for every backend.

use std::future::Future;

use super::address::normalize;
use super::types::{AddressKey, LookupResult, RangeRecord};
use crate::error_handling::{LookupError, ResolveError, SourceError};

/// Anything that can answer "which ranges contain this key".
pub trait RangeSource {
    /// Returns every record with `ip_from <= key <= ip_to`, in any order.
    fn candidates(
        &self,
        key: AddressKey,
    ) -> impl Future<Output = Result<Vec<RangeRecord>, SourceError>> + Send;
}

/// Picks the record to report among covering candidates.
///
/// More than one candidate only happens when the dataset has overlapping
/// ranges. The candidate with the largest `ip_from` (the latest-starting,
/// usually narrowest range) wins; on an exactly equal `ip_from` the first
/// one seen is kept.
pub fn select_best<I>(candidates: I) -> Option<RangeRecord>
where
    I: IntoIterator<Item = RangeRecord>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.ip_from <= current.ip_from => Some(current),
        _ => Some(candidate),
    })
}

/// Resolves a key to its covering range, if any.
///
/// `Ok(None)` means no range covers the key. A failing source is reported as
/// `ResolveError::ResolutionFailed` and is not retried.
pub async fn resolve<S>(key: AddressKey, source: &S) -> Result<Option<RangeRecord>, ResolveError>
where
    S: RangeSource,
{
    let candidates = source.candidates(key).await?;
    Ok(select_best(candidates))
}

/// Normalizes `address` and resolves it against `source`.
///
/// An invalid address fails before the source is queried.
pub async fn lookup<S>(address: &str, source: &S) -> Result<LookupResult, LookupError>
where
    S: RangeSource,
{
    let key = normalize(address)?;
    let record = resolve(key, source).await?;
    Ok(LookupResult::new(address, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::types::test_record;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Linear scan over a fixed list, counting queries.
    struct ListSource {
        records: Vec<RangeRecord>,
        queries: AtomicUsize,
    }

    impl ListSource {
        fn new(records: Vec<RangeRecord>) -> Self {
            ListSource {
                records,
                queries: AtomicUsize::new(0),
            }
        }
    }

    impl RangeSource for ListSource {
        async fn candidates(&self, key: AddressKey) -> Result<Vec<RangeRecord>, SourceError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .records
                .iter()
                .filter(|r| r.contains(key))
                .cloned()
                .collect())
        }
    }

    struct FailingSource;

    impl RangeSource for FailingSource {
        async fn candidates(&self, _key: AddressKey) -> Result<Vec<RangeRecord>, SourceError> {
            Err(SourceError::MalformedRow("ip_from is not a number".to_string()))
        }
    }

    fn two_ranges() -> ListSource {
        ListSource::new(vec![test_record(0, 999, "A"), test_record(1000, 1999, "B")])
    }

    #[tokio::test]
    async fn test_resolve_adjacent_ranges() {
        let source = two_ranges();

        let a = resolve(AddressKey::new(500), &source).await.unwrap().unwrap();
        assert_eq!(a.city_name, "A");

        let b = resolve(AddressKey::new(1000), &source).await.unwrap().unwrap();
        assert_eq!(b.city_name, "B");

        let edge = resolve(AddressKey::new(999), &source).await.unwrap().unwrap();
        assert_eq!(edge.city_name, "A");

        assert!(resolve(AddressKey::new(2000), &source).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_overlap_prefers_largest_ip_from() {
        let source = ListSource::new(vec![test_record(0, 1999, "A"), test_record(1000, 1500, "B")]);
        let record = resolve(AddressKey::new(1200), &source).await.unwrap().unwrap();
        assert_eq!(record.city_name, "B");

        // Outside the inner range only the outer one covers the key
        let record = resolve(AddressKey::new(1600), &source).await.unwrap().unwrap();
        assert_eq!(record.city_name, "A");
    }

    #[test]
    fn test_select_best_is_order_independent() {
        let forward = select_best(vec![
            test_record(0, 1999, "A"),
            test_record(1000, 1500, "B"),
            test_record(500, 1800, "C"),
        ]);
        let backward = select_best(vec![
            test_record(500, 1800, "C"),
            test_record(1000, 1500, "B"),
            test_record(0, 1999, "A"),
        ]);
        assert_eq!(forward.unwrap().city_name, "B");
        assert_eq!(backward.unwrap().city_name, "B");
    }

    #[test]
    fn test_select_best_keeps_first_on_equal_ip_from() {
        let best = select_best(vec![test_record(10, 20, "first"), test_record(10, 30, "second")]);
        assert_eq!(best.unwrap().city_name, "first");
    }

    #[test]
    fn test_select_best_compares_full_128_bits() {
        let high = u128::MAX - 5;
        let best = select_best(vec![
            test_record(1, u128::MAX, "low"),
            test_record(high, u128::MAX, "high"),
        ]);
        assert_eq!(best.unwrap().city_name, "high");
        assert!(select_best(Vec::<RangeRecord>::new()).is_none());
    }

    #[tokio::test]
    async fn test_source_failure_is_not_a_miss() {
        let err = resolve(AddressKey::new(1), &FailingSource).await.unwrap_err();
        let ResolveError::ResolutionFailed(source) = err;
        assert!(source.to_string().contains("ip_from is not a number"));
    }

    #[tokio::test]
    async fn test_lookup_invalid_address_skips_query() {
        let source = two_ranges();
        let err = lookup("999.1.1.1", &source).await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidAddress(_)));
        assert_eq!(source.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_mapped_ipv4_end_to_end() {
        let from = crate::config::IPV4_MAPPED_BASE + 0x0808_0800;
        let to = crate::config::IPV4_MAPPED_BASE + 0x0808_08ff;
        let source = ListSource::new(vec![test_record(from, to, "Mountain View")]);

        for address in ["8.8.8.8", "::ffff:8.8.8.8"] {
            let result = lookup(address, &source).await.unwrap();
            assert_eq!(result.queried_address, address);
            assert!(result.found);
            let record = result.record.unwrap();
            assert_eq!(record.country_code, "US");
            assert_eq!(record.region_name, "California");
            assert_eq!(record.city_name, "Mountain View");
        }

        let miss = lookup("1.1.1.1", &source).await.unwrap();
        assert!(!miss.found);
        assert!(miss.record.is_none());
        assert_eq!(source.queries.load(Ordering::SeqCst), 3);
    }
}
