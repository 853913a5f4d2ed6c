//! Fixed instructions and output schema sent with every identification.

use serde_json::{Value, json};

use crate::domain::CANNOT_BE_ESTIMATED;

/// Instructions for the model: identify the species, describe it, and
/// estimate size and weight while correcting for forced perspective.
pub const IDENTIFICATION_INSTRUCTIONS: &str = r#"
Act as an expert fishing guide and marine biologist. Your task is to analyze the provided image and return detailed information about the fish caught.

**Primary Objectives:**
1.  **Identify Species:** Accurately identify the fish species.
2.  **Provide Details:** Give a brief description, habitat information, and edibility status.
3.  **Estimate Size & Weight:** This is a critical step.
    *   Carefully analyze the image for any objects that can provide a sense of scale. Look for human hands, fishing lures, rods, reels, feet, or any common background items.
    *   Be mindful of camera perspective. Anglers often hold fish closer to the camera to make them appear larger. Try to correct for this "forced perspective" distortion in your estimation.
    *   Provide the estimated size (length) and weight as a realistic range (e.g., "Approx. 45-50 cm", "Approx. 2.0-2.5 kg").
    *   If there are absolutely no contextual clues for scale, you MUST return "Cannot be estimated" for both size and weight fields. Do not guess wildly.

**Output Format:**
Respond ONLY with a valid JSON object matching the provided schema. If the image does not contain a fish or it's completely unidentifiable, populate the 'error' field with a user-friendly message and leave other fields null.
"#;

/// Structured-output schema in the Gemini `responseSchema` dialect.
///
/// No field is marked required so the model can return an error-only
/// object; completeness of a success is checked when parsing.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "species": {
                "type": "STRING",
                "description": "The common name of the fish species."
            },
            "description": {
                "type": "STRING",
                "description": "A brief, interesting paragraph about the fish, including its characteristics."
            },
            "habitat": {
                "type": "STRING",
                "description": "The typical habitat where this fish is found (e.g., saltwater reefs, freshwater rivers)."
            },
            "isEdible": {
                "type": "BOOLEAN",
                "description": "A boolean indicating if the fish is commonly considered edible."
            },
            "estimatedSize": {
                "type": "STRING",
                "description": format!(
                    "An estimated size (length) of the fish based on visual context in the image, as a string range (e.g., 'Approx. 30-35 cm'). If not possible, should be '{CANNOT_BE_ESTIMATED}'."
                )
            },
            "estimatedWeight": {
                "type": "STRING",
                "description": format!(
                    "An estimated weight of the fish based on visual context and species type, as a string range (e.g., 'Approx. 1.0-1.2 kg'). If not possible, should be '{CANNOT_BE_ESTIMATED}'."
                )
            },
            "error": {
                "type": "STRING",
                "nullable": true,
                "description": "If the image does not contain a fish or is unidentifiable, provide a user-friendly error message here. Otherwise, this should be null or omitted."
            }
        }
    })
}
