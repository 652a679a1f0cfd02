pub mod ip;
pub mod payload;

/// 追踪码字符集
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_CHARSET[rand::random_range(0..CODE_CHARSET.len())] as char)
        .take(length)
        .collect()
}

/// 合法追踪码：非空、长度有限、只含字母数字
///
/// 不合法的追踪码直接 404，不会触发数据库查询。
pub fn is_valid_tracking_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 32 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
