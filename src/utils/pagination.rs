/// Page size used when the client sends none or an out-of-range one.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest accepted page size.
pub const MAX_LIMIT: i64 = 100;

/// Number of pages needed for `total` items: `ceil(total / limit)`, 0 when empty.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    let mut pages = total / limit;
    if total % limit != 0 {
        pages += 1;
    }
    pages
}

/// 1-indexed page that `offset` falls on.
pub fn current_page(offset: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 1;
    }
    (offset.max(0) / limit).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceiling_division() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(2, 100), 1);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn pages_matches_ceil_for_a_range_of_inputs() {
        for limit in 1..=25 {
            for total in 0..=200 {
                let expected = (total + limit - 1) / limit;
                assert_eq!(total_pages(total, limit), expected, "{total}/{limit}");
            }
        }
    }

    #[test]
    fn page_is_floor_division_plus_one() {
        assert_eq!(current_page(0, 20), 1);
        assert_eq!(current_page(19, 20), 1);
        assert_eq!(current_page(20, 20), 2);
        assert_eq!(current_page(40, 20), 3);
    }

    #[test]
    fn page_saturates_at_the_largest_offset() {
        assert_eq!(current_page(i64::MAX, 1), i64::MAX);
        assert_eq!(current_page(i64::MAX, 100), i64::MAX / 100 + 1);
        assert_eq!(total_pages(i64::MAX, 1), i64::MAX);
    }
}
