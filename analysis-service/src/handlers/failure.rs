//! Fallback candidates for requests that never reach a usable model reply.
//!
//! Both are plain candidates run through the normalizer like any upstream
//! output, so failure responses satisfy the same contract as successes.

use serde_json::{Value, json};

/// Candidate for a missing, undecodable, or too-small image. Marked
/// not-a-stool-image, so normalization emits the retake guidance.
pub fn invalid_image_candidate(worker_version: &str) -> Value {
    json!({
        "ok": false,
        "is_stool_image": false,
        "error_code": "INVALID_IMAGE",
        "error": "INVALID_IMAGE",
        "message": "image is missing or invalid",
        "worker_version": worker_version,
        "proxy_version": "unknown",
        "model_used": "unknown",
        "headline": "图片信息不足，无法分析",
        "score": 0,
        "risk_level": "unknown",
        "confidence": 0,
        "uncertainty_note": "请提供清晰、光线充足的图片，并保证目标占画面主要区域。",
    })
}

/// Candidate for a relay that is unreachable or answered garbage. Stays on
/// the positive branch so the client still gets a fully-shaped result with
/// retry-oriented sections.
pub fn proxy_error_candidate(
    worker_version: &str,
    proxy_version: &str,
    model_used: &str,
    message: &str,
) -> Value {
    json!({
        "ok": false,
        "error_code": "PROXY_ERROR",
        "error": "PROXY_ERROR",
        "message": message,
        "worker_version": worker_version,
        "proxy_version": proxy_version,
        "model_used": model_used,
        "headline": "服务暂不可用，请稍后重试",
        "score": 0,
        "risk_level": "unknown",
        "confidence": 0,
        "uncertainty_note": "服务繁忙或网络异常，可稍后重试或更换清晰图片。",
        "ui_strings": {
            "sections": [
                {
                    "title": "重试建议",
                    "icon_key": "retry",
                    "items": ["稍后再试", "检查网络连接", "更换清晰图片"],
                },
                {
                    "title": "如何拍/如何裁剪",
                    "icon_key": "camera",
                    "items": ["光线充足", "对焦清晰", "目标占画面 50% 以上"],
                },
                {
                    "title": "建议补充信息",
                    "icon_key": "question",
                    "items": ["是否发热/呕吐", "24h 排便次数", "近期饮食与饮水"],
                },
                {
                    "title": "观察指标",
                    "icon_key": "observe",
                    "items": ["精神与食欲是否下降", "排便次数是否增多", "是否伴随发热或呕吐"],
                },
            ],
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContextInput, NormalizeMeta, normalize};

    #[test]
    fn invalid_image_normalizes_to_retake_guidance() {
        let meta = NormalizeMeta {
            worker_version: "w1".into(),
            proxy_version: None,
            model_used: None,
        };
        let result = normalize(
            &invalid_image_candidate("w1"),
            &meta,
            &ContextInput::default(),
        );
        assert!(!result.ok);
        assert!(!result.is_stool_image());
        assert_eq!(result.error_code.as_deref(), Some("INVALID_IMAGE"));
        assert_eq!(result.headline, "图片信息不足，无法分析");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn proxy_error_keeps_retry_sections() {
        let meta = NormalizeMeta {
            worker_version: "w1".into(),
            proxy_version: Some("p1".into()),
            model_used: Some("m1".into()),
        };
        let candidate = proxy_error_candidate("w1", "p1", "m1", "boom");
        let result = normalize(&candidate, &meta, &ContextInput::default());
        assert!(!result.ok);
        assert!(result.is_stool_image());
        assert_eq!(result.error_code.as_deref(), Some("PROXY_ERROR"));
        match &result.outcome {
            crate::contract::Outcome::Stool(report) => {
                assert_eq!(report.ui_strings.sections.len(), 4);
                assert_eq!(report.ui_strings.sections[0].title, "重试建议");
            }
            _ => panic!("expected positive branch"),
        }
    }
}
