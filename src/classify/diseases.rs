//! Static disease tables shared by the live-model and mock paths.
//!
//! Both paths map a class code through the same immutable data so outputs
//! stay identical regardless of which path produced the prediction.

use crate::models::Severity;

/// One class the hosted model can emit, with the base confidence the mock
/// generator starts from. Order matters: the mock selection index and the
/// probability redistribution both walk this table in order.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseClass {
    pub code: &'static str,
    pub name: &'static str,
    pub base_confidence: f64,
}

pub const DISEASE_CLASSES: [DiseaseClass; 7] = [
    DiseaseClass {
        code: "nv",
        name: "Melanocytic nevi",
        base_confidence: 0.87,
    },
    DiseaseClass {
        code: "mel",
        name: "Melanoma",
        base_confidence: 0.78,
    },
    DiseaseClass {
        code: "bkl",
        name: "Benign keratosis",
        base_confidence: 0.82,
    },
    DiseaseClass {
        code: "bcc",
        name: "Basal cell carcinoma",
        base_confidence: 0.75,
    },
    DiseaseClass {
        code: "akiec",
        name: "Actinic keratoses",
        base_confidence: 0.81,
    },
    DiseaseClass {
        code: "vasc",
        name: "Vascular lesions",
        base_confidence: 0.79,
    },
    DiseaseClass {
        code: "df",
        name: "Dermatofibroma",
        base_confidence: 0.84,
    },
];

/// Display information for a class code.
#[derive(Debug, Clone, Copy)]
pub struct DiseaseInfo {
    pub full_name: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

static UNKNOWN_INFO: DiseaseInfo = DiseaseInfo {
    full_name: "Unknown",
    severity: Severity::Unknown,
    description: "Unable to determine specific condition. Please consult a dermatologist.",
    recommendations: &["Consult a dermatologist for proper diagnosis and treatment"],
};

/// Display name for a prediction. Known codes use the table's full name;
/// an unrecognized code falls back to the model-reported name, then to the
/// generic entry's name.
pub fn display_name(code: &str, reported_name: Option<&str>) -> String {
    match lookup(code) {
        Some(info) => info.full_name.to_string(),
        None => reported_name.unwrap_or(UNKNOWN_INFO.full_name).to_string(),
    }
}

/// Look up display info for a class code. An unrecognized code maps to the
/// generic consult-a-professional entry.
pub fn disease_info(code: &str) -> &'static DiseaseInfo {
    lookup(code).unwrap_or(&UNKNOWN_INFO)
}

fn lookup(code: &str) -> Option<&'static DiseaseInfo> {
    static TABLE: [(&str, DiseaseInfo); 7] = [
        (
            "nv",
            DiseaseInfo {
                full_name: "Melanocytic nevi: benign mole",
                severity: Severity::Low,
                description: "A benign (non-cancerous) mole formed by melanocytes. Generally harmless but should be monitored for changes.",
                recommendations: &[
                    "Monitor the mole for any changes in size, shape, or color",
                    "Use sunscreen to protect your skin",
                    "Schedule regular skin checks with a dermatologist",
                    "Take photos to track any changes over time",
                ],
            },
        ),
        (
            "mel",
            DiseaseInfo {
                full_name: "Melanoma: dangerous skin cancer",
                severity: Severity::High,
                description: "A type of skin cancer that develops in melanocytes. Early detection is crucial for successful treatment.",
                recommendations: &[
                    "Consult a dermatologist immediately for professional evaluation",
                    "Avoid sun exposure and use SPF 50+ sunscreen",
                    "Monitor the area for any changes in size, shape, or color",
                    "Do not attempt self-treatment",
                ],
            },
        ),
        (
            "bkl",
            DiseaseInfo {
                full_name: "Benign keratosis: non-cancerous growth",
                severity: Severity::Low,
                description: "A non-cancerous skin growth that is usually harmless. Common in older adults.",
                recommendations: &[
                    "Consult with a dermatologist if it changes or becomes irritated",
                    "Protect skin from excessive sun exposure",
                    "Regular skin monitoring is recommended",
                    "Treatment is usually not necessary unless for cosmetic reasons",
                ],
            },
        ),
        (
            "bcc",
            DiseaseInfo {
                full_name: "Basal cell carcinoma: type of skin cancer",
                severity: Severity::Moderate,
                description: "The most common form of skin cancer, usually caused by sun exposure. Generally slow-growing and treatable.",
                recommendations: &[
                    "Schedule an appointment with a dermatologist",
                    "Protect the area from sun exposure",
                    "Use broad-spectrum sunscreen daily",
                    "Avoid picking or scratching the area",
                ],
            },
        ),
        (
            "akiec",
            DiseaseInfo {
                full_name: "Actinic keratoses: precancerous lesions",
                severity: Severity::Moderate,
                description: "Rough, scaly patches on skin caused by years of sun exposure. Considered precancerous and should be treated.",
                recommendations: &[
                    "Consult with a dermatologist for treatment options",
                    "Use daily sunscreen (SPF 30+)",
                    "Wear protective clothing when outdoors",
                    "Regular skin checks to monitor progression",
                ],
            },
        ),
        (
            "vasc",
            DiseaseInfo {
                full_name: "Vascular lesions: abnormal blood vessels",
                severity: Severity::Low,
                description: "Abnormalities in blood vessels that appear on the skin. Usually benign but may require medical evaluation.",
                recommendations: &[
                    "Consult a dermatologist for proper diagnosis",
                    "Avoid trauma to the affected area",
                    "Monitor for any changes in size or appearance",
                    "Treatment options are available if desired",
                ],
            },
        ),
        (
            "df",
            DiseaseInfo {
                full_name: "Dermatofibroma: benign skin nodule",
                severity: Severity::Low,
                description: "A common benign skin growth, usually firm to the touch. Generally harmless and does not require treatment.",
                recommendations: &[
                    "No treatment necessary unless it becomes bothersome",
                    "Avoid scratching or irritating the area",
                    "Consult a dermatologist if it changes or causes discomfort",
                    "Removal is possible if desired for cosmetic reasons",
                ],
            },
        ),
    ];

    // Linear walk; 7 entries, no map needed.
    TABLE.iter().find(|(c, _)| *c == code).map(|(_, info)| info)
}
