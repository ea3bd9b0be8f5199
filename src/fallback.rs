//! Static substitute data for when live data is unavailable.
//!
//! Every dataset is already canonical: each record carries the full required
//! field set of its kind, so callers use it without normalising.

use crate::constants::messages;
use crate::record::{CanonicalRecord, ChatReply, MobileFeatures, RecordKind};
use serde_json::{json, Value};

/// Datasets ship with the crate and change only with a release
pub const FALLBACK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Non-empty canonical dataset for `kind`
pub fn defaults_for(kind: RecordKind) -> Vec<CanonicalRecord> {
    let raw = match kind {
        RecordKind::Hospital => hospitals(),
        RecordKind::Resource => resources(),
        RecordKind::Encouragement => encouragements(),
        RecordKind::SelfExamStep => self_exam_steps(),
    };
    raw.into_iter()
        .map(|v| CanonicalRecord::from_json(kind, v))
        .collect()
}

pub fn default_chat_reply() -> ChatReply {
    ChatReply {
        response: messages::CHAT_FALLBACK.to_string(),
        suggestions: vec![
            "How do I do a self-exam?".to_string(),
            "Find a hospital near me".to_string(),
            "What are the early signs?".to_string(),
        ],
        is_offline: true,
    }
}

pub fn default_greeting() -> ChatReply {
    ChatReply {
        response: messages::GREETING_FALLBACK.to_string(),
        suggestions: vec![
            "Self-exam guide".to_string(),
            "Hospital search".to_string(),
            "Risk factors".to_string(),
        ],
        is_offline: true,
    }
}

pub fn default_mobile_features() -> MobileFeatures {
    let feature = |id: u32, icon: &str, title: &str, description: &str, key: &str, enabled: bool| {
        json!({
            "id": id,
            "icon": icon,
            "title": title,
            "description": description,
            "enabled": enabled,
            "settingKey": key,
        })
    };
    let upcoming = |id: u32, icon: &str, title: &str, description: &str, status: &str| {
        json!({
            "id": id,
            "icon": icon,
            "title": title,
            "description": description,
            "status": status,
        })
    };

    MobileFeatures {
        exclusive: vec![
            feature(1, "📱", "Push Reminders", "Get timely reminders for self-exams and appointments", "pushNotifications", true),
            feature(2, "🔔", "Smart Alerts", "Personalized health alerts based on your activity", "reminderAlerts", true),
            feature(3, "📶", "Offline Access", "Access key resources without internet connection", "offlineMode", false),
            feature(4, "💾", "Data Saving", "Optimize data usage for slower connections", "dataSaving", true),
            feature(5, "🌙", "Dark Mode", "Comfortable viewing in low light conditions", "darkMode", false),
            feature(6, "🎤", "Voice Assistant", "Hands-free navigation and chat using voice", "voiceAssistant", false),
        ],
        upcoming: vec![
            upcoming(7, "👥", "Live Support Groups", "Real-time video support sessions (Coming Soon)", "beta"),
            upcoming(8, "🏃‍♀️", "Activity Tracking", "Sync with health apps for wellness tracking (Coming Soon)", "planned"),
            upcoming(9, "🌍", "Multi-language", "Support for multiple languages (In Development)", "development"),
        ],
    }
}

#[allow(clippy::too_many_arguments)]
fn hospital(
    id: u32,
    name: &str,
    address: &str,
    phone: &str,
    services: &str,
    hours: &str,
    specialty: &str,
    insurance: &[&str],
    rating: f64,
    wait_time: u32,
    kind: &str,
    county: &str,
    (latitude, longitude): (f64, f64),
) -> Value {
    json!({
        "id": id,
        "name": name,
        "address": address,
        "phone": phone,
        "services": services,
        "hours": hours,
        "specialty": specialty,
        "insurance": insurance,
        "rating": rating,
        "waitTime": wait_time,
        "isOpen": true,
        "type": kind,
        "county": county,
        "latitude": latitude,
        "longitude": longitude,
    })
}

fn hospitals() -> Vec<Value> {
    vec![
        hospital(
            1,
            "Nairobi Women's Hospital",
            "James Gichuru Road, Lavington, Nairobi, Kenya",
            "+254 20 272 6000",
            "Mammography, Ultrasound, Biopsy, Breast Surgery, Oncology",
            "24/7",
            "Comprehensive Women's Healthcare",
            &["NHIF", "Madison", "Jubilee", "AAR", "Private Pay"],
            4.8,
            15,
            "National Hospital",
            "Nairobi",
            (-1.2684, 36.7965),
        ),
        hospital(
            2,
            "Aga Khan University Hospital",
            "3rd Parklands Avenue, Nairobi, Kenya",
            "+254 20 366 2000",
            "Breast Screening, Genetic Testing, Surgical Oncology, Radiation Therapy",
            "Mon-Sun: 6AM-10PM",
            "Comprehensive Cancer Care",
            &["NHIF", "Jubilee", "AAR", "CIC", "Liberty"],
            4.9,
            20,
            "National Hospital",
            "Nairobi",
            (-1.2545, 36.8004),
        ),
        hospital(
            3,
            "Kenyatta National Hospital",
            "Hospital Road, Nairobi, Kenya",
            "+254 20 272 6300",
            "Mammography, Clinical Breast Exam, Biopsy, Cancer Treatment",
            "24/7",
            "National Referral Hospital",
            &["NHIF", "All major providers"],
            4.5,
            30,
            "National Hospital",
            "Nairobi",
            (-1.3045, 36.8075),
        ),
        hospital(
            4,
            "Mombasa Hospital",
            "Mama Ngina Drive, Mombasa, Kenya",
            "+254 41 231 2191",
            "Breast Screening, Ultrasound, Women's Health, Consultation",
            "Mon-Sun: 7AM-9PM",
            "Coastal Healthcare Services",
            &["NHIF", "Madison", "Jubilee"],
            4.3,
            25,
            "County Hospital",
            "Mombasa",
            (-4.0547, 39.6636),
        ),
        hospital(
            5,
            "Nakuru General Hospital",
            "Hospital Road, Nakuru, Kenya",
            "+254 51 221 0000",
            "Breast Screening, Clinical Exams, Basic Diagnostics",
            "Mon-Sun: 24/7",
            "Regional Healthcare Services",
            &["NHIF", "Private Pay"],
            4.2,
            35,
            "County Hospital",
            "Nakuru",
            (-0.3031, 36.0800),
        ),
        hospital(
            6,
            "Kisumu County Hospital",
            "Jomo Kenyatta Highway, Kisumu, Kenya",
            "+254 57 202 0000",
            "Breast Screening, Women's Health, General Medicine",
            "24/7",
            "Lakeside Healthcare",
            &["NHIF", "Private Pay"],
            4.1,
            40,
            "County Hospital",
            "Kisumu",
            (-0.0917, 34.7680),
        ),
        hospital(
            7,
            "Eldoret Hospital",
            "Uganda Road, Eldoret, Kenya",
            "+254 53 203 0000",
            "Breast Screening, Surgical Services, Maternity Care",
            "24/7",
            "Rift Valley Healthcare",
            &["NHIF", "Madison", "Jubilee"],
            4.0,
            30,
            "County Hospital",
            "Uasin Gishu",
            (0.5143, 35.2698),
        ),
        hospital(
            8,
            "Thika Level 5 Hospital",
            "Garissa Road, Thika, Kenya",
            "+254 67 224 0000",
            "Breast Screening, Emergency Care, Laboratory Services",
            "24/7",
            "Central Kenya Healthcare",
            &["NHIF", "Private Pay"],
            4.2,
            25,
            "County Hospital",
            "Kiambu",
            (-1.0333, 37.0833),
        ),
        hospital(
            9,
            "Kakamega General Hospital",
            "Hospital Road, Kakamega, Kenya",
            "+254 56 302 0000",
            "Breast Screening, Pediatric Care, General Medicine",
            "24/7",
            "Western Kenya Healthcare",
            &["NHIF"],
            3.9,
            45,
            "County Hospital",
            "Kakamega",
            (0.2827, 34.7519),
        ),
        hospital(
            10,
            "Garissa Hospital",
            "Kismayu Road, Garissa, Kenya",
            "+254 46 210 0000",
            "Breast Screening, Maternal Health, Emergency Services",
            "24/7",
            "Northern Kenya Healthcare",
            &["NHIF", "Private Pay"],
            3.8,
            50,
            "County Hospital",
            "Garissa",
            (-0.4532, 39.6461),
        ),
    ]
}

fn resources() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Breast Self-Examination Guide",
            "description": "Step-by-step instructions for monthly breast self-exams with illustrations and tips.",
            "category": "guides",
            "type": "pdf",
            "duration": "10 min read",
            "level": "Beginner",
            "url": "https://example.com/self-exam-guide.pdf",
            "icon": "📖",
        }),
        json!({
            "id": 2,
            "title": "Understanding Mammograms",
            "description": "Everything you need to know about mammogram screening, preparation, and results.",
            "category": "screening",
            "type": "article",
            "duration": "8 min read",
            "level": "Intermediate",
            "url": "https://example.com/mammogram-guide",
            "icon": "🏥",
        }),
        json!({
            "id": 3,
            "title": "Breast Cancer Risk Factors",
            "description": "Learn about genetic, lifestyle, and environmental factors that affect breast cancer risk.",
            "category": "prevention",
            "type": "interactive",
            "duration": "12 min read",
            "level": "Intermediate",
            "url": "https://example.com/risk-factors",
            "icon": "🔍",
        }),
        json!({
            "id": 4,
            "title": "Nutrition for Breast Health",
            "description": "Foods and dietary habits that support breast health and overall wellness.",
            "category": "prevention",
            "type": "article",
            "duration": "6 min read",
            "level": "Beginner",
            "url": "https://example.com/nutrition-guide",
            "icon": "🥦",
        }),
        json!({
            "id": 5,
            "title": "Coping with Diagnosis",
            "description": "Emotional support and practical advice for those newly diagnosed with breast cancer.",
            "category": "support",
            "type": "guide",
            "duration": "15 min read",
            "level": "All Levels",
            "url": "https://example.com/coping-guide",
            "icon": "💝",
        }),
        json!({
            "id": 6,
            "title": "Family History & Genetics",
            "description": "Understanding hereditary risks and when to consider genetic testing.",
            "category": "prevention",
            "type": "article",
            "duration": "10 min read",
            "level": "Advanced",
            "url": "https://example.com/genetics-guide",
            "icon": "🧬",
        }),
    ]
}

fn encouragements() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "message": "After my diagnosis, I found strength in taking things one day at a time. Regular self-exams helped me catch it early!",
            "type": "story",
            "author": "Sarah, 34",
            "timestamp": "2 days ago",
            "likes": 24,
        }),
        json!({
            "id": 2,
            "message": "I set my self-exam reminder for the same day I pay my rent - hard to forget both!",
            "type": "tip",
            "author": "Maria, 42",
            "timestamp": "1 week ago",
            "likes": 18,
        }),
        json!({
            "id": 3,
            "message": "How do you all remember to do monthly checks? Looking for accountability buddies!",
            "type": "question",
            "author": "Jessica, 29",
            "timestamp": "3 days ago",
            "likes": 12,
        }),
        json!({
            "id": 4,
            "message": "I am strong, I am capable, and I prioritize my health because I deserve care and attention.",
            "type": "affirmation",
            "author": "Daily Wellness",
            "timestamp": "Today",
            "likes": 56,
        }),
        json!({
            "id": 5,
            "message": "You are not alone 💖",
            "type": messages::DEFAULT_ENCOURAGEMENT_TYPE,
            "author": "Anonymous Friend",
            "timestamp": "",
            "likes": 0,
        }),
    ]
}

fn self_exam_steps() -> Vec<Value> {
    let step = |id: u32, title: &str, description: &str, icon: &str, tip: &str| {
        json!({
            "id": id,
            "title": title,
            "description": description,
            "icon": icon,
            "tip": tip,
        })
    };
    vec![
        step(
            1,
            "Visual Inspection",
            "Stand in front of a mirror with your shoulders straight and your arms on your hips. \
             Look for any changes in size, shape, color, or visible distortion.",
            "👀",
            "Look for dimpling, puckering, or changes in skin texture",
        ),
        step(
            2,
            "Raise Arms",
            "Raise your arms overhead and look for the same changes.",
            "🙆",
            "Check for any fluid coming from the nipples",
        ),
        step(
            3,
            "Check for Fluid",
            "While still in front of the mirror, look for any signs of fluid coming out of one or both nipples.",
            "💧",
            "Note any discharge that is watery, milky, or yellow fluid, or blood",
        ),
        step(
            4,
            "Lying Down Position",
            "Lie down and feel your breasts using a firm, smooth touch. Keep fingers flat and together, \
             use a circular motion about the size of a quarter.",
            "🛌",
            "Use the pads of your fingers, not the tips",
        ),
        step(
            5,
            "Cover Entire Breast",
            "Cover the entire breast from top to bottom, side to side: from your collarbone to the top \
             of your abdomen, and from your armpit to your cleavage.",
            "🔄",
            "Follow a pattern to ensure you cover the whole breast",
        ),
        step(
            6,
            "Repeat in Shower",
            "Repeat the same steps while standing or sitting in the shower. Soapy hands make it easier \
             to feel the breast tissue.",
            "🚿",
            "Many women find this the easiest way to perform the exam",
        ),
    ]
}
