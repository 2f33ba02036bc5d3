// ==========================================
// ERP 报表核心 - 日期窗口策略
// ==========================================
// 职责: 校验并补全查询日期窗口 [from, to]
// 规则:
// - 缺省 from → now - default_range_days（溢出 → WindowOutOfRange）
// - 缺省 to → now
// - from > to → InvalidDateRange
// - 跨度（整天数, 截断）> max_range_days → DateRangeTooLarge
// 红线: 纯函数, 无副作用
// ==========================================

use chrono::{Local, NaiveDateTime, TimeDelta};
use thiserror::Error;

/// 默认查询窗口（天）
pub const DEFAULT_RANGE_DAYS: i64 = 7;

/// 最大查询跨度（天）
pub const MAX_RANGE_DAYS: i64 = 365;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("开始日期晚于结束日期: from={from}, to={to}")]
    InvalidDateRange { from: NaiveDateTime, to: NaiveDateTime },

    #[error("日期跨度过大: {days} 天 (上限 {max_days} 天)")]
    DateRangeTooLarge { days: i64, max_days: i64 },

    #[error("默认查询窗口超出可表示的日期范围: {days} 天")]
    WindowOutOfRange { days: i64 },
}

// ==========================================
// DateRangePolicy - 日期窗口策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangePolicy {
    default_range_days: i64,
    max_range_days: i64,
}

impl Default for DateRangePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_DAYS, MAX_RANGE_DAYS)
    }
}

impl DateRangePolicy {
    pub fn new(default_range_days: i64, max_range_days: i64) -> Self {
        Self {
            default_range_days,
            max_range_days,
        }
    }

    pub fn default_range_days(&self) -> i64 {
        self.default_range_days
    }

    pub fn max_range_days(&self) -> i64 {
        self.max_range_days
    }

    /// 以当前本地时间为基准归一化
    pub fn normalize(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<(NaiveDateTime, NaiveDateTime), DateRangeError> {
        self.normalize_at(from, to, Local::now().naive_local())
    }

    /// 以指定时间为基准归一化
    pub fn normalize_at(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<(NaiveDateTime, NaiveDateTime), DateRangeError> {
        let from = match from {
            Some(from) => from,
            None => self.default_from(now)?,
        };
        let to = to.unwrap_or(now);

        ensure_ordered(from, to)?;

        let days = (to - from).num_days();
        if days > self.max_range_days {
            return Err(DateRangeError::DateRangeTooLarge {
                days,
                max_days: self.max_range_days,
            });
        }

        Ok((from, to))
    }

    fn default_from(&self, now: NaiveDateTime) -> Result<NaiveDateTime, DateRangeError> {
        let days = self.default_range_days;
        TimeDelta::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or(DateRangeError::WindowOutOfRange { days })
    }
}

/// 仅校验顺序（审计日志查询使用, 不限制跨度）
pub fn ensure_ordered(from: NaiveDateTime, to: NaiveDateTime) -> Result<(), DateRangeError> {
    if from > to {
        return Err(DateRangeError::InvalidDateRange { from, to });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_valid_range_returned_unchanged() {
        let policy = DateRangePolicy::default();
        let (from, to) = policy
            .normalize(Some(at(2025, 1, 1)), Some(at(2025, 1, 31)))
            .unwrap();
        assert_eq!(from, at(2025, 1, 1));
        assert_eq!(to, at(2025, 1, 31));
    }

    #[test]
    fn test_defaults_to_last_seven_days() {
        let policy = DateRangePolicy::default();
        let now = at(2025, 6, 15);

        let (from, to) = policy.normalize_at(None, None, now).unwrap();
        assert_eq!(from, at(2025, 6, 8));
        assert_eq!(to, now);
    }

    #[test]
    fn test_defaults_against_wall_clock() {
        let policy = DateRangePolicy::default();
        let before = Local::now().naive_local();
        let (from, to) = policy.normalize(None, None).unwrap();
        let after = Local::now().naive_local();

        assert!(to >= before && to <= after);
        assert_eq!((to - from).num_days(), 7);
    }

    #[test]
    fn test_from_after_to_rejected() {
        let policy = DateRangePolicy::default();
        let err = policy
            .normalize(Some(at(2025, 2, 1)), Some(at(2025, 1, 1)))
            .unwrap_err();
        assert!(matches!(err, DateRangeError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_span_limit_is_inclusive_of_365_days() {
        let policy = DateRangePolicy::default();
        let from = at(2025, 1, 1);

        assert!(policy
            .normalize(Some(from), Some(from + Duration::days(365)))
            .is_ok());

        let err = policy
            .normalize(Some(from), Some(from + Duration::days(366)))
            .unwrap_err();
        assert_eq!(
            err,
            DateRangeError::DateRangeTooLarge {
                days: 366,
                max_days: 365
            }
        );
    }

    #[test]
    fn test_partial_day_is_truncated() {
        let policy = DateRangePolicy::default();
        let from = at(2025, 1, 1);
        let to = from + Duration::days(365) + Duration::hours(23);

        assert!(policy.normalize(Some(from), Some(to)).is_ok());
    }

    #[test]
    fn test_huge_default_window_is_an_error() {
        let policy = DateRangePolicy::new(200_000_000, 200_000_000);

        let err = policy.normalize(None, None).unwrap_err();
        assert_eq!(err, DateRangeError::WindowOutOfRange { days: 200_000_000 });

        // 显式给出 from 时不计算默认窗口
        assert!(policy
            .normalize(Some(at(2025, 1, 1)), Some(at(2025, 2, 1)))
            .is_ok());

        let err = DateRangePolicy::new(i64::MAX, i64::MAX)
            .normalize_at(None, None, at(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, DateRangeError::WindowOutOfRange { .. }));
    }

    #[test]
    fn test_custom_window() {
        let policy = DateRangePolicy::new(30, 60);
        let now = at(2025, 3, 31);

        let (from, _) = policy.normalize_at(None, None, now).unwrap();
        assert_eq!(from, at(2025, 3, 1));
        assert!(policy
            .normalize_at(Some(at(2025, 1, 1)), None, now)
            .is_err());
    }
}
