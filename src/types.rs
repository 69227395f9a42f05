// types.rs - Request/response bodies and render parameters
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_DURATION_SECS: u32 = 30;

pub const FRAME_WIDTH: u32 = 1280;
pub const FRAME_HEIGHT: u32 = 720;
pub const FRAME_RATE: u32 = 24;
pub const CAPTION_FONT_SIZE: u32 = 70;

// Body of POST /api/create-video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub topic: String,
    // integer or whole-number float seconds, e.g. 30 or 30.0
    #[serde(default)]
    pub duration: Option<serde_json::Number>,
}

/// A request that passed validation; the only shape the orchestrator accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub topic: String,
    pub duration_secs: u32,
}

impl VideoRequest {
    pub fn validate(&self, max_duration_secs: u32) -> Result<ValidatedRequest, AppError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(AppError::Validation("topic must not be empty".to_string()));
        }

        let duration = match &self.duration {
            Some(number) => whole_seconds(number)?,
            None => DEFAULT_DURATION_SECS as i64,
        };
        if duration <= 0 {
            return Err(AppError::Validation(format!(
                "duration must be a positive number of seconds, got {}",
                duration
            )));
        }
        if duration > max_duration_secs as i64 {
            return Err(AppError::Validation(format!(
                "duration must be at most {} seconds, got {}",
                max_duration_secs, duration
            )));
        }

        Ok(ValidatedRequest {
            topic: topic.to_string(),
            duration_secs: duration as u32,
        })
    }
}

fn whole_seconds(number: &serde_json::Number) -> Result<i64, AppError> {
    if let Some(secs) = number.as_i64() {
        return Ok(secs);
    }
    match number.as_f64() {
        // `as` saturates, so huge values still fail the upper bound check
        Some(secs) if secs.is_finite() && secs.fract() == 0.0 => Ok(secs as i64),
        _ => Err(AppError::Validation(format!(
            "duration must be a whole number of seconds, got {}",
            number
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideoResponse {
    pub status: String,
    pub video_path: String,
}

impl CreateVideoResponse {
    pub fn success(video_path: String) -> Self {
        Self {
            status: "success".to_string(),
            video_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoLookupResponse {
    pub video_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

// Everything the renderer needs to produce one captioned clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub text: String,
    pub duration_secs: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub font_size: u32,
    pub font_color: String,
    pub background_color: String,
    pub align: TextAlign,
    pub caption: bool, // wrap text to the frame width
}

impl RenderSpec {
    /// White centered caption over a black 1280x720 frame at 24 fps.
    pub fn caption(text: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            text: text.into(),
            duration_secs,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            fps: FRAME_RATE,
            font_size: CAPTION_FONT_SIZE,
            font_color: "white".to_string(),
            background_color: "black".to_string(),
            align: TextAlign::Center,
            caption: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, duration: Option<i64>) -> VideoRequest {
        VideoRequest {
            topic: topic.to_string(),
            duration: duration.map(serde_json::Number::from),
        }
    }

    fn parsed(body: &str) -> VideoRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn missing_duration_defaults_to_thirty_seconds() {
        let validated = request("the history of bridges", None).validate(600).unwrap();
        assert_eq!(validated.duration_secs, 30);
        assert_eq!(validated.topic, "the history of bridges");
    }

    #[test]
    fn topic_is_trimmed() {
        let validated = request("  volcanoes \n", Some(10)).validate(600).unwrap();
        assert_eq!(validated.topic, "volcanoes");
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert!(matches!(
            request("   ", Some(10)).validate(600),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(matches!(request("x", Some(0)).validate(600), Err(AppError::Validation(_))));
        assert!(matches!(request("x", Some(-5)).validate(600), Err(AppError::Validation(_))));
    }

    #[test]
    fn duration_above_limit_is_rejected() {
        assert!(request("x", Some(600)).validate(600).is_ok());
        assert!(matches!(request("x", Some(601)).validate(600), Err(AppError::Validation(_))));
    }

    #[test]
    fn null_duration_deserializes_as_default() {
        let req: VideoRequest = serde_json::from_str(r#"{"topic":"tides","duration":null}"#).unwrap();
        assert_eq!(req.validate(600).unwrap().duration_secs, DEFAULT_DURATION_SECS);
    }

    #[test]
    fn whole_number_float_duration_is_accepted() {
        let validated = parsed(r#"{"topic":"tides","duration":45.0}"#).validate(600).unwrap();
        assert_eq!(validated.duration_secs, 45);
    }

    #[test]
    fn fractional_duration_is_rejected() {
        let err = parsed(r#"{"topic":"tides","duration":12.5}"#).validate(600).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn float_durations_still_respect_bounds() {
        assert!(matches!(
            parsed(r#"{"topic":"tides","duration":0.0}"#).validate(600),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parsed(r#"{"topic":"tides","duration":1e300}"#).validate(600),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn caption_spec_uses_fixed_frame() {
        let spec = RenderSpec::caption("hello", 12);
        assert_eq!((spec.width, spec.height, spec.fps), (1280, 720, 24));
        assert_eq!(spec.font_size, 70);
        assert_eq!(spec.align, TextAlign::Center);
        assert_eq!(spec.duration_secs, 12);
    }
}
