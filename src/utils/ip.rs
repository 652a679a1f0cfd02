//! 客户端 IP 提取
//!
//! 默认使用 TCP 连接的对端地址；部署在反向代理之后时，
//! 开启 `server.trust_forwarded_headers` 改用 X-Forwarded-For / X-Real-IP。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

/// 从 HttpRequest 提取客户端 IP
pub fn extract_client_ip(req: &HttpRequest, trust_forwarded: bool) -> Option<String> {
    if trust_forwarded && let Some(forwarded) = extract_forwarded_ip_from_headers(req.headers()) {
        debug!("Using forwarded client IP: {}", forwarded);
        return Some(forwarded);
    }

    req.connection_info().peer_addr().map(strip_port)
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(strip_port)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(strip_port)
        })
}

/// 去掉地址中的端口部分（"1.2.3.4:80" / "[::1]:80"）
pub fn strip_port(addr: &str) -> String {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        return socket_addr.ip().to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return ip.to_string();
    }
    addr.trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}

/// 读取 User-Agent 头
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("127.0.0.1:8080"), "127.0.0.1");
        assert_eq!(strip_port("127.0.0.1"), "127.0.0.1");
        assert_eq!(strip_port("[::1]:443"), "::1");
        assert_eq!(strip_port("::1"), "::1");
        assert_eq!(strip_port("[2001:db8::1]"), "2001:db8::1");
    }

    #[test]
    fn test_forwarded_header_takes_first_hop() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7, 10.0.0.1"))
            .to_http_request();
        assert_eq!(
            extract_forwarded_ip_from_headers(req.headers()).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_x_real_ip_fallback() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "198.51.100.2"))
            .to_http_request();
        assert_eq!(
            extract_forwarded_ip_from_headers(req.headers()).as_deref(),
            Some("198.51.100.2")
        );
    }

    #[test]
    fn test_forwarded_ignored_when_untrusted() {
        let req = TestRequest::default()
            .peer_addr("192.0.2.10:5555".parse().unwrap())
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_http_request();

        assert_eq!(extract_client_ip(&req, false).as_deref(), Some("192.0.2.10"));
        assert_eq!(extract_client_ip(&req, true).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_user_agent() {
        let req = TestRequest::default()
            .insert_header(("user-agent", "curl/8.0"))
            .to_http_request();
        assert_eq!(extract_user_agent(&req).as_deref(), Some("curl/8.0"));
        assert!(extract_user_agent(&TestRequest::default().to_http_request()).is_none());
    }
}
