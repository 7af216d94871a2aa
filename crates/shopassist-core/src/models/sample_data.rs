use super::agent_response::AgentResponse;
use super::message::Message;
use super::product::Product;

/// Fixed demonstration conversation: one question, one answer with three
/// laptops and three follow-up suggestions.
pub fn sample_conversation(now_millis: i64) -> Vec<Message> {
    let reply = AgentResponse {
        message: "I found some excellent laptops perfect for graphic design work.".to_string(),
        recommendations: sample_products(),
        suggestions: strings(&[
            "Show me budget options under $1,500",
            "What about tablets for design?",
            "Compare these models",
        ]),
    };

    vec![
        Message::user("I need a laptop for graphic design work", now_millis - 60_000),
        Message::assistant_with_content(
            "I found some excellent laptops perfect for graphic design work. These models offer \
             powerful processors, dedicated graphics cards, and high-resolution displays ideal \
             for creative professionals.",
            reply,
            now_millis - 30_000,
        ),
    ]
}

fn sample_products() -> Vec<Product> {
    vec![
        Product {
            product_name: Some("MacBook Pro 16\" M3 Max".to_string()),
            price: Some("$3,499".to_string()),
            description: Some(
                "Professional-grade laptop with M3 Max chip, 36GB RAM, and stunning Liquid \
                 Retina XDR display"
                    .to_string(),
            ),
            features: strings(&[
                "M3 Max chip",
                "36GB unified memory",
                "16.2\" Liquid Retina XDR",
                "1TB SSD",
            ]),
            image_url: Some("https://placehold.co/400x225/10b981/ffffff?text=MacBook+Pro".to_string()),
            category: Some("Laptops".to_string()),
            pros: strings(&[
                "Exceptional performance",
                "Best-in-class display",
                "Long battery life",
                "Premium build quality",
            ]),
            cons: strings(&["Expensive", "Limited ports", "No touchscreen"]),
        },
        Product {
            product_name: Some("Dell XPS 15 OLED".to_string()),
            price: Some("$2,299".to_string()),
            description: Some(
                "High-performance Windows laptop with Intel i9, NVIDIA RTX 4070, and stunning \
                 4K OLED display"
                    .to_string(),
            ),
            features: strings(&[
                "Intel Core i9-13900H",
                "NVIDIA RTX 4070",
                "15.6\" 4K OLED",
                "32GB RAM",
            ]),
            image_url: Some("https://placehold.co/400x225/10b981/ffffff?text=Dell+XPS+15".to_string()),
            category: Some("Laptops".to_string()),
            pros: strings(&[
                "Gorgeous OLED display",
                "Powerful GPU",
                "Windows compatibility",
                "Expandable storage",
            ]),
            cons: strings(&[
                "Battery life moderate",
                "Runs hot under load",
                "Webcam placement",
            ]),
        },
        Product {
            product_name: Some("ASUS ProArt Studiobook".to_string()),
            price: Some("$1,899".to_string()),
            description: Some(
                "Creator-focused laptop with color-accurate display, RTX graphics, and \
                 professional tools"
                    .to_string(),
            ),
            features: strings(&[
                "AMD Ryzen 9",
                "NVIDIA RTX 4060",
                "16\" OLED 4K",
                "Pantone validated",
            ]),
            image_url: Some("https://placehold.co/400x225/10b981/ffffff?text=ASUS+ProArt".to_string()),
            category: Some("Laptops".to_string()),
            pros: strings(&[
                "Color-accurate display",
                "Great value",
                "Dial control",
                "Portable",
            ]),
            cons: strings(&["Plastic build", "Average speakers", "Shorter battery life"]),
        },
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
