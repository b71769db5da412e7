//! Style presets and prompt composition

use clap::ValueEnum;

use crate::roster::Character;

/// Overall rendering style, prepended to every prompt in a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum StylePreset {
    /// Polished modern VTuber character sheet
    SoftModern,
    /// Crisp cel shading with strong highlights
    #[default]
    AnimeCel,
    /// Thick painted shading, artbook finish
    AnimePainterly,
}

impl StylePreset {
    /// The prompt fragment for this style. Ends with a space so it can be
    /// glued straight onto the rest of the prompt.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::SoftModern => {
                "high-quality Japanese anime style for modern VTuber visual design, polished \
                 professional character sheet quality, clean lineart, detailed rendering, rich but \
                 cohesive decorative design, consistent identity, no text, no logo, no watermark. "
            }
            Self::AnimeCel => {
                "high-end Japanese anime character design, crisp clean lineart, strong cel shading, \
                 2-to-3 tone shadows, sharp highlights on hair and fabric, high contrast and vivid but \
                 controlled saturation, professional VTuber key visual quality, no text, no logo, \
                 no watermark. "
            }
            Self::AnimePainterly => {
                "premium anime illustration with thick painted shading, rich gradient shadows, clear \
                 form modeling, layered highlights, polished artbook quality, strong character identity, \
                 decorative and luxurious VTuber costume detail, no text, no logo, no watermark. "
            }
        }
    }
}

/// Palette clause that discourages hue and exposure drift between calls.
pub fn color_lock(character: &Character) -> String {
    format!(
        "Color lock palette: {}. \
         Keep exact same costume and hair colors across all outputs. \
         No hue shift, no recoloring, no dramatic exposure change. \
         Use neutral studio lighting and consistent white balance.",
        character.palette
    )
}

/// Full-body, front-facing text-to-image prompt.
pub fn standing(style: StylePreset, character: &Character) -> String {
    format!(
        "{}Character: {}. {}. {} \
         Single character, full body standing pose, front-facing, complete outfit and shoes \
         fully visible, strong silhouette readability, plain light background, design-reference \
         quality, highly detailed accessories.",
        style.prefix(),
        character.name,
        character.description,
        color_lock(character)
    )
}

/// Three-view sheet, edited from the standing image.
pub fn turnaround(style: StylePreset, character: &Character) -> String {
    format!(
        "{}{} \
         Create a clean turnaround sheet with 3 full-body views in one image: \
         front view, right-side view, back view. \
         Keep face, hairstyle, outfit, proportions, and accessories fully consistent. \
         White background, no text labels, preserve complex accessory placement.",
        style.prefix(),
        same_character(character)
    )
}

/// Upper-body livestream portrait, edited from the standing image.
pub fn stream_bust(style: StylePreset, character: &Character) -> String {
    format!(
        "{}{} \
         Upper-body portrait for livestream thumbnail, facing viewer, \
         clear face and hair details, rich costume details near shoulder/chest, \
         clean light background close to off-white. Keep identity and outfit motifs consistent \
         with the reference.",
        style.prefix(),
        same_character(character)
    )
}

fn same_character(character: &Character) -> String {
    format!(
        "Same exact character as the reference ({}). {}",
        character.name,
        color_lock(character)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::character;

    #[test]
    fn every_prompt_starts_with_style_and_carries_palette() {
        let mint = character("mint", "Mint");
        for style in StylePreset::value_variants() {
            for prompt in [
                standing(*style, &mint),
                turnaround(*style, &mint),
                stream_bust(*style, &mint),
            ] {
                assert!(prompt.starts_with(style.prefix()));
                assert!(prompt.contains("Color lock palette: main #000000."));
            }
        }
    }

    #[test]
    fn dependent_prompts_point_at_reference() {
        let mint = character("mint", "Mint");
        let prompt = turnaround(StylePreset::AnimeCel, &mint);
        assert!(prompt.contains("Same exact character as the reference (Mint)."));
        assert!(prompt.contains("front view, right-side view, back view."));
        assert!(!prompt.contains("description of mint"));

        let standing = standing(StylePreset::AnimeCel, &mint);
        assert!(standing.contains("Character: Mint. description of mint. Color lock"));
    }

    #[test]
    fn preset_names_are_kebab_case() {
        let names: Vec<String> = StylePreset::value_variants()
            .iter()
            .filter_map(|preset| preset.to_possible_value())
            .map(|value| value.get_name().to_string())
            .collect();
        assert_eq!(names, ["soft-modern", "anime-cel", "anime-painterly"]);
        assert_eq!(StylePreset::default(), StylePreset::AnimeCel);
    }
}
