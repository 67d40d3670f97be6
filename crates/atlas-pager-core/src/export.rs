use crate::model::{Atlas, Page};
use serde_json::{Value, json};
use std::path::Path;

/// Image filenames for `count` pages: `{base}0.png`, `{base}1.png`, ...
pub fn page_image_names(base: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{}{}.png", base, i)).collect()
}

/// Manifest filename paired with a page image: same stem, `.xml` extension.
pub fn manifest_name(image_name: &str) -> String {
    let stem = Path::new(image_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image_name);
    format!("{}.xml", stem)
}

/// Texture name as written to manifests: the key's base name without extension.
pub fn texture_name(key: &str) -> String {
    let normalized = key.replace('\\', "/");
    Path::new(&normalized)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or(normalized)
}

/// Render one page as an XML manifest referencing `image_name`.
///
/// ```text
/// <atlas-page img="Atlas0.png">
/// <texture filename="grass" x="4" y="4" width="64" height="64" />
/// </atlas-page>
/// ```
pub fn to_xml_page<K: ToString>(page: &Page<K>, image_name: &str) -> String {
    let mut s = String::new();
    s.push_str(&format!("<atlas-page img=\"{}\">\n", xml_escape(image_name)));
    for fr in &page.frames {
        s.push_str(&format!(
            "<texture filename=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" />\n",
            xml_escape(&texture_name(&fr.key.to_string())),
            fr.frame.x,
            fr.frame.y,
            fr.frame.w,
            fr.frame.h,
        ));
    }
    s.push_str("</atlas-page>");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serialize the whole `Atlas` as a JSON object `{ pages, meta }` (array-of-pages style).
/// When `page_names` has one entry per page, each page also carries its `image`.
pub fn to_json_array<K: ToString>(atlas: &Atlas<K>, page_names: &[String]) -> Value {
    let pages_val = atlas
        .pages
        .iter()
        .map(|p| {
            let frames_val: Vec<Value> = p
                .frames
                .iter()
                .map(|fr| {
                    let key = fr.key.to_string();
                    json!({
                        "key": key,
                        "name": texture_name(&key),
                        "x": fr.frame.x,
                        "y": fr.frame.y,
                        "w": fr.frame.w,
                        "h": fr.frame.h,
                    })
                })
                .collect();
            let mut page = json!({
                "id": p.id,
                "width": p.width,
                "height": p.height,
                "frames": frames_val,
            });
            if let Some(name) = page_names.get(p.id) {
                page["image"] = json!(name);
            }
            page
        })
        .collect::<Vec<_>>();
    json!({"pages": pages_val, "meta": &atlas.meta})
}
