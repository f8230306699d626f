//! HTML page and inline SVG charts.

use std::f64::consts::PI;
use std::fmt::Write;

use crate::{
    dashboard::{
        DashboardState, FloatSlider, IntSlider, PredictionReport, AGE_SLIDER, DISTANCE_SLIDER,
        RATING_SLIDER,
    },
    types::{FeatureWeight, InputVector, OrderType, PredictionResult, RiskTier, VehicleType},
};

pub const GAUGE_MAX: f64 = 60.0;

/// Gauge colour bands over `[0, GAUGE_MAX]` minutes.
pub const GAUGE_BANDS: [(f64, f64, &str); 3] = [
    (0.0, 25.0, "lightgreen"),
    (25.0, 40.0, "yellow"),
    (40.0, 60.0, "red"),
];

const STYLE: &str = "\
body{font-family:sans-serif;background:#f5f7fa;margin:0}\
main{max-width:960px;margin:auto;padding:1em 2em}\
.cols{display:flex;gap:2em}.cols>section{flex:1}\
label{display:block;margin-top:.8em}input[type=range],select{width:100%}\
button{background:#ff4b4b;color:#fff;border:0;border-radius:10px;height:3em;width:100%;font-size:16px;margin-top:1.5em}\
.kpis{display:flex;gap:1em}.kpi{flex:1}.kpi .label{font-size:.9em;color:#555}.kpi .value{font-size:2em}\
.banner{padding:.8em;border-radius:6px}.error{background:#fde2e2}.warning{background:#fff6d5}.success{background:#e1f5e6}";

pub fn page(state: &DashboardState) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<title>AI Delivery Time Predictor</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body><main>");
    html.push_str("<h1>Smart Food Delivery Time Predictor</h1>");
    html.push_str("<h3>AI-powered ETA Estimation &amp; Risk Analysis System</h3><hr>");

    inputs_form(&mut html, state.inputs());

    if let DashboardState::ResultShown { report } = state {
        html.push_str(&render_results(report));
    }

    html.push_str("<hr><footer>Built with Machine Learning &amp; Rust</footer>");
    html.push_str("</main></body></html>");
    html
}

fn inputs_form(html: &mut String, inputs: &InputVector) {
    html.push_str("<form method=\"post\" action=\"/predict\"><div class=\"cols\">");

    html.push_str("<section><h2>Delivery Partner Details</h2>");
    int_slider(html, &AGE_SLIDER, inputs.age);
    float_slider(html, &RATING_SLIDER, inputs.rating);
    float_slider(html, &DISTANCE_SLIDER, inputs.distance_km);
    html.push_str("</section>");

    html.push_str("<section><h2>Order Details</h2>");
    select(
        html,
        "order_type",
        "Order Type",
        OrderType::ALL.iter().map(|o| o.as_str()),
        inputs.order_type.as_str(),
    );
    select(
        html,
        "vehicle_type",
        "Vehicle Type",
        VehicleType::ALL.iter().map(|v| v.as_str()),
        inputs.vehicle_type.as_str(),
    );
    html.push_str("</section></div>");

    html.push_str("<button type=\"submit\">Predict Delivery Time</button></form>");
}

fn int_slider(html: &mut String, s: &IntSlider, value: i64) {
    range_input(html, s.name, s.label, &s.min.to_string(), &s.max.to_string(), "1", &value.to_string());
}

fn float_slider(html: &mut String, s: &FloatSlider, value: f64) {
    range_input(
        html,
        s.name,
        s.label,
        &s.min.to_string(),
        &s.max.to_string(),
        &s.step.to_string(),
        &value.to_string(),
    );
}

fn range_input(html: &mut String, name: &str, label: &str, min: &str, max: &str, step: &str, value: &str) {
    let _ = write!(
        html,
        "<label for=\"{name}\">{label}: <output id=\"{name}_out\">{value}</output></label>\
         <input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\" \
         oninput=\"document.getElementById('{name}_out').value=this.value\">"
    );
}

fn select<'a>(
    html: &mut String,
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) {
    let _ = write!(html, "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">");
    for opt in options {
        let sel = if opt == selected { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{opt}\"{sel}>{opt}</option>");
    }
    html.push_str("</select>");
}

/// Result panel: KPIs, risk banner, gauge, risk bar and, when the model
/// has them, feature importances.
pub fn render_results(report: &PredictionReport) -> String {
    let mut html = String::new();
    let r = &report.result;
    html.push_str("<hr><h2>Prediction Results</h2>");

    html.push_str("<div class=\"kpis\">");
    kpi(&mut html, "Predicted Time (mins)", &format!("{:.2}", r.predicted_minutes));
    kpi(&mut html, "Minimum ETA", &format!("{} mins", r.min_eta));
    kpi(&mut html, "Maximum ETA", &format!("{} mins", r.max_eta));
    html.push_str("</div><hr>");

    risk_banner(&mut html, r);
    html.push_str(&gauge_svg(r.predicted_minutes));
    html.push_str(&risk_bar_svg(r.risk_score));

    if let Some(weights) = &report.feature_importance {
        html.push_str("<hr><h2>Feature Importance Analysis</h2>");
        html.push_str(&importance_svg(weights));
    }
    html
}

fn kpi(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<div class=\"kpi\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
    );
}

fn risk_banner(html: &mut String, r: &PredictionResult) {
    let (class, text) = match r.risk_tier {
        RiskTier::High => ("error", "High Delay Risk Detected"),
        RiskTier::Moderate => ("warning", "Moderate Delay Risk"),
        RiskTier::Low => ("success", "Low Delay Risk"),
    };
    let _ = write!(html, "<div class=\"banner {class}\">{text}</div>");
}

// Gauge geometry: half circle opening downward, 0 on the left.
const G_CX: f64 = 160.0;
const G_CY: f64 = 170.0;
const G_R: f64 = 120.0;

fn gauge_point(minutes: f64) -> (f64, f64) {
    let theta = PI * minutes.clamp(0.0, GAUGE_MAX) / GAUGE_MAX;
    (G_CX - G_R * theta.cos(), G_CY - G_R * theta.sin())
}

fn arc(from: f64, to: f64, color: &str, width: u32) -> String {
    let (x0, y0) = gauge_point(from);
    let (x1, y1) = gauge_point(to);
    format!(
        "<path d=\"M {x0:.2} {y0:.2} A {G_R} {G_R} 0 0 1 {x1:.2} {y1:.2}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\"/>"
    )
}

/// Half-circle gauge of the predicted minutes on a fixed 0–60 scale.
pub fn gauge_svg(minutes: f64) -> String {
    let mut svg = String::from(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"320\" height=\"220\" class=\"gauge\">",
    );
    svg.push_str("<text x=\"160\" y=\"20\" text-anchor=\"middle\">Delivery Time (Minutes)</text>");
    for (from, to, color) in GAUGE_BANDS {
        svg.push_str(&arc(from, to, color, 30));
    }
    if minutes > 0.0 {
        svg.push_str(&arc(0.0, minutes, "darkred", 10));
    }
    let _ = write!(
        svg,
        "<text x=\"{:.0}\" y=\"195\" text-anchor=\"middle\">0</text>\
         <text x=\"{:.0}\" y=\"195\" text-anchor=\"middle\">{GAUGE_MAX}</text>\
         <text x=\"160\" y=\"165\" text-anchor=\"middle\" font-size=\"32\">{minutes:.2}</text></svg>",
        G_CX - G_R,
        G_CX + G_R,
    );
    svg
}

/// Single vertical bar of the risk score on a fixed 0–100 axis.
pub fn risk_bar_svg(score: u8) -> String {
    const TOP: f64 = 30.0;
    const HEIGHT: f64 = 160.0;
    let bottom = TOP + HEIGHT;
    let h = HEIGHT * f64::from(score.min(100)) / 100.0;

    let mut svg = String::from(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"320\" height=\"230\" class=\"risk-bar\">",
    );
    svg.push_str("<text x=\"160\" y=\"18\" text-anchor=\"middle\">Delivery Delay Risk Score (%)</text>");
    for tick in (0..=100).step_by(20) {
        let y = bottom - HEIGHT * f64::from(tick) / 100.0;
        let _ = write!(
            svg,
            "<line x1=\"50\" x2=\"300\" y1=\"{y:.1}\" y2=\"{y:.1}\" stroke=\"#ddd\"/>\
             <text x=\"44\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{tick}</text>",
            y + 4.0
        );
    }
    let _ = write!(
        svg,
        "<rect x=\"135\" y=\"{:.1}\" width=\"50\" height=\"{h:.1}\" fill=\"#636efa\"/>\
         <text x=\"160\" y=\"{:.1}\" text-anchor=\"middle\">{score}</text>\
         <text x=\"160\" y=\"{:.1}\" text-anchor=\"middle\">Risk Score</text></svg>",
        bottom - h,
        bottom - h - 6.0,
        bottom + 20.0,
    );
    svg
}

/// Horizontal bars, one per feature, in the order given.
pub fn importance_svg(weights: &[FeatureWeight]) -> String {
    const ROW: f64 = 28.0;
    const LABEL_W: f64 = 110.0;
    const BAR_W: f64 = 240.0;

    let max = weights
        .iter()
        .map(|w| w.importance)
        .fold(0.0_f64, f64::max);
    let height = 40.0 + ROW * weights.len() as f64;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"420\" height=\"{height:.0}\" class=\"importance\">\
         <text x=\"210\" y=\"18\" text-anchor=\"middle\">Model Feature Impact</text>"
    );
    for (i, w) in weights.iter().enumerate() {
        let y = 30.0 + ROW * i as f64;
        let len = if max > 0.0 { BAR_W * w.importance / max } else { 0.0 };
        let _ = write!(
            svg,
            "<text x=\"{:.0}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"12\">{}</text>\
             <rect x=\"{LABEL_W:.0}\" y=\"{y:.1}\" width=\"{len:.1}\" height=\"20\" fill=\"#636efa\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{:.3}</text>",
            LABEL_W - 6.0,
            y + 14.0,
            w.feature,
            LABEL_W + len + 4.0,
            y + 14.0,
            w.importance,
        );
    }
    svg.push_str("</svg>");
    svg
}
