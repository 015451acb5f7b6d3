//! 分享意图 URL：`<base>?text=<percent-encoded content>`
//!
//! 纯函数；打开链接交给宿主环境。

/// 默认的发推意图地址
pub const DEFAULT_SHARE_BASE_URL: &str = "https://twitter.com/intent/tweet";

pub fn share_intent_url(base_url: &str, content: &str) -> String {
    format!("{}?text={}", base_url, urlencoding::encode(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_encodes_content() {
        let url = share_intent_url(DEFAULT_SHARE_BASE_URL, "Hello world & more?");
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=Hello%20world%20%26%20more%3F"
        );
    }

    #[test]
    fn test_share_url_encodes_newlines_and_unicode() {
        let url = share_intent_url("https://x.com/intent/tweet", "a\nb #c 你");
        assert_eq!(
            url,
            "https://x.com/intent/tweet?text=a%0Ab%20%23c%20%E4%BD%A0"
        );
    }
}
