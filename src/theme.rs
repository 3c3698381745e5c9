use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub line_color: String,
    pub line_width: f32,
    pub node_fill: String,
    pub node_border: String,
    pub port_color: String,
    pub hit_rect_fill: String,
    pub hit_rect_stroke: String,
    pub background: String,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            line_color: "#7A8AA6".to_string(),
            line_width: 1.6,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            port_color: "#3B82F6".to_string(),
            hit_rect_fill: "rgba(239, 68, 68, 0.08)".to_string(),
            hit_rect_stroke: "#EF4444".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn blueprint() -> Self {
        Self {
            line_color: "#E2E8F0".to_string(),
            line_width: 1.4,
            node_fill: "#1E3A5F".to_string(),
            node_border: "#93C5FD".to_string(),
            port_color: "#FBBF24".to_string(),
            hit_rect_fill: "rgba(251, 191, 36, 0.12)".to_string(),
            hit_rect_stroke: "#FBBF24".to_string(),
            background: "#0F2540".to_string(),
        }
    }
}
