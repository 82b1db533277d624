use std::env;

/// 读取布尔型环境变量：支持 true/false/1/0（大小写不敏感）
pub fn env_is_true(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        }
        Err(_) => default,
    }
}

/// 读取字符串环境变量，若不存在则返回默认值
pub fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) => v,
        Err(_) => default.to_string(),
    }
}

/// 读取 i64 环境变量，不存在或解析失败返回默认值
pub fn env_i64(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(v) => v.trim().parse::<i64>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

/// 读取 u64 环境变量，不存在或解析失败返回默认值
pub fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

/// 开关缺省语义：默认 fail-open（缺失/过期的开关视为放行）；
/// 设置 SWITCH_FAIL_CLOSED=true 可切换为 fail-closed
pub fn switch_fail_closed() -> bool {
    env_is_true("SWITCH_FAIL_CLOSED", false)
}

/// 运行级租约时长（秒）
pub fn run_lock_lease_secs() -> i64 {
    env_i64("RUN_LOCK_LEASE_SECS", 300)
}

/// 交易对级租约时长（秒）
pub fn symbol_lock_lease_secs() -> i64 {
    env_i64("SYMBOL_LOCK_LEASE_SECS", 60)
}

/// 校验缓存 TTL（秒）
pub fn validation_cache_ttl_secs() -> u64 {
    env_u64("VALIDATION_CACHE_TTL_SECS", 30)
}

/// 入场区间有效期（分钟）
pub fn entry_zone_validity_minutes() -> i64 {
    env_i64("ENTRY_ZONE_VALIDITY_MINUTES", 15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_defaults() {
        assert!(env_is_true("MTF_NOT_SET_XYZ", true));
        assert!(!env_is_true("MTF_NOT_SET_XYZ", false));
        assert_eq!(env_or_default("MTF_NOT_SET_XYZ", "abc"), "abc");
        assert_eq!(env_i64("MTF_NOT_SET_XYZ", 7), 7);
    }
}
