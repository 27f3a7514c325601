//! Voice selection and SSML rendering for each speaking style.

use crate::ports::VoiceStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceProfile {
    pub voice_name: &'static str,
    pub rate: &'static str,
    pub pitch: &'static str,
}

impl VoiceProfile {
    pub fn for_style(style: VoiceStyle) -> Self {
        match style {
            VoiceStyle::Professional => Self {
                voice_name: "en-US-AriaNeural",
                rate: "medium",
                pitch: "medium",
            },
            VoiceStyle::Friendly => Self {
                voice_name: "en-US-JennyNeural",
                rate: "medium",
                pitch: "medium",
            },
            VoiceStyle::Authoritative => Self {
                voice_name: "en-US-GuyNeural",
                rate: "slow",
                pitch: "low",
            },
        }
    }

    /// Wraps `text` in a speak/voice/prosody document.
    pub fn to_ssml(&self, text: &str) -> String {
        format!(
            r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="en-US"><voice name="{}"><prosody rate="{}" pitch="{}">{}</prosody></voice></speak>"#,
            self.voice_name,
            self.rate,
            self.pitch,
            escape_xml(text)
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_map_to_voices() {
        assert_eq!(VoiceProfile::for_style(VoiceStyle::Professional).voice_name, "en-US-AriaNeural");
        assert_eq!(VoiceProfile::for_style(VoiceStyle::Friendly).voice_name, "en-US-JennyNeural");
        let authoritative = VoiceProfile::for_style(VoiceStyle::Authoritative);
        assert_eq!((authoritative.rate, authoritative.pitch), ("slow", "low"));
    }

    #[test]
    fn ssml_escapes_text() {
        let ssml = VoiceProfile::for_style(VoiceStyle::Professional).to_ssml("Q&A <now>");
        assert!(ssml.contains("<voice name=\"en-US-AriaNeural\">"));
        assert!(ssml.contains("Q&amp;A &lt;now&gt;"));
    }
}
