use glam::Vec2;

/// Maps a CSS client position to canvas backing pixels, given the canvas'
/// bounding rect and its backing size.
#[inline]
pub fn client_to_canvas_px(
    client: Vec2,
    rect_origin: Vec2,
    rect_size: Vec2,
    canvas_size: Vec2,
) -> Vec2 {
    let local = client - rect_origin;
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return local;
    }
    local / rect_size * canvas_size
}

/// Touch identifiers are small non-negative integers in practice; keep the
/// bit pattern so a negative one still maps to a distinct key.
#[inline]
pub fn touch_key(identifier: i32) -> u64 {
    identifier as u32 as u64
}
