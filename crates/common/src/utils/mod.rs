/// 工具函数集合

use uuid::Uuid;

/// 生成唯一 ID
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// 验证 IPv4 地址格式（简单验证）
pub fn validate_ip_address(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }

    parts.iter().all(|part| part.parse::<u8>().is_ok())
}

/// 验证网段格式，例如 "172.2.3.0/24"
pub fn validate_network_num(network_num: &str) -> bool {
    let parts: Vec<&str> = network_num.split('/').collect();
    if parts.len() != 2 {
        return false;
    }
    if !validate_ip_address(parts[0]) {
        return false;
    }
    match parts[1].parse::<u8>() {
        Ok(prefix) => prefix <= 32,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID v4 格式
    }

    #[test]
    fn test_validate_ip_address() {
        assert!(validate_ip_address("192.168.1.1"));
        assert!(validate_ip_address("10.0.0.1"));
        assert!(!validate_ip_address("256.1.1.1"));
        assert!(!validate_ip_address("192.168.1"));
        assert!(!validate_ip_address("invalid"));
    }

    #[test]
    fn test_validate_network_num() {
        assert!(validate_network_num("172.2.3.0/24"));
        assert!(validate_network_num("10.0.0.0/8"));
        assert!(!validate_network_num("172.2.3.0"));
        assert!(!validate_network_num("172.2.3.0/33"));
        assert!(!validate_network_num("abc/24"));
    }
}
