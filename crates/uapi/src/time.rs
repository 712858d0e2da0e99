//! 时间相关定义

/// 对应 Linux 的 `struct timespec`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpec {
    /// 秒
    pub tv_sec: i64,
    /// 纳秒，范围 [0, 1_000_000_000)
    pub tv_nsec: i64,
}

impl TimeSpec {
    /// 每秒纳秒数
    pub const NSEC_PER_SEC: i64 = 1_000_000_000;

    /// 创建新的时间值，纳秒部分会被规范化到 [0, 1s)
    pub const fn new(sec: i64, nsec: i64) -> Self {
        let carry = nsec.div_euclid(Self::NSEC_PER_SEC);
        Self {
            tv_sec: sec + carry,
            tv_nsec: nsec.rem_euclid(Self::NSEC_PER_SEC),
        }
    }

    /// 零时刻
    pub const fn zero() -> Self {
        Self {
            tv_sec: 0,
            tv_nsec: 0,
        }
    }

    /// 按给定粒度（纳秒）向下截断，对应 Linux 的 `timestamp_truncate`
    pub fn truncate(self, gran_ns: u32) -> Self {
        match gran_ns {
            0 | 1 => self,
            g if g as i64 >= Self::NSEC_PER_SEC => Self::new(self.tv_sec, 0),
            g => Self::new(self.tv_sec, self.tv_nsec - self.tv_nsec % g as i64),
        }
    }
}
