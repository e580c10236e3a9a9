use super::DomainError;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 100;

/// Offset/limit window for list queries. `limit` is always within [1, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Result<Self, DomainError> {
        Self::with_default(skip, limit, DEFAULT_LIMIT)
    }

    pub fn with_default(
        skip: Option<u64>,
        limit: Option<u64>,
        default_limit: u64,
    ) -> Result<Self, DomainError> {
        let limit = limit.unwrap_or(default_limit);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DomainError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        let offset = skip.unwrap_or(0);
        // Offsets are bound as signed 64-bit integers.
        if offset > i64::MAX as u64 {
            return Err(DomainError::Validation(format!(
                "skip must not exceed {}",
                i64::MAX
            )));
        }
        Ok(Self {
            offset,
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_bounds() {
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination::default());
        assert_eq!(Pagination::with_default(Some(5), None, 20).unwrap().limit, 20);
        assert!(Pagination::new(None, Some(0)).is_err());
        assert!(Pagination::new(None, Some(101)).is_err());
        assert_eq!(Pagination::new(Some(40), Some(100)).unwrap().offset, 40);
    }

    #[test]
    fn skip_must_fit_a_signed_offset() {
        let max = i64::MAX as u64;
        assert_eq!(Pagination::new(Some(max), None).unwrap().offset, max);
        assert!(matches!(
            Pagination::new(Some(max + 1), None),
            Err(DomainError::Validation(_))
        ));
        assert!(Pagination::new(Some(u64::MAX), Some(10)).is_err());
    }
}
