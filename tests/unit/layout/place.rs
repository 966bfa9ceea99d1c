use super::*;

const CANVAS: Canvas = Canvas::SHORTS;

#[test]
fn position_zero_pins_top_and_ten_pins_bottom() {
    let b = place(200, 48, CANVAS, 0);
    assert_eq!(b.y, 0);
    let b = place(200, 48, CANVAS, 10);
    assert_eq!(b.y, 1080 - 48);
}

#[test]
fn vertical_position_is_floored() {
    for p in 0..=10 {
        for h in [1u32, 17, 48, 333, 1079] {
            let b = place(10, h, CANVAS, p);
            let expected = ((1080 - h as i64) * p as i64) / 10;
            assert_eq!(b.y as i64, expected, "p={p} h={h}");
        }
    }
    assert_eq!(place(10, 47, CANVAS, 3).y, 309);
}

#[test]
fn horizontal_centering_floors() {
    assert_eq!(place(200, 10, CANVAS, 5).x, 204);
    assert_eq!(place(201, 10, CANVAS, 5).x, 203);
    for w in [1u32, 99, 300, 607] {
        assert_eq!(place(w, 10, CANVAS, 2).x as u32, (608 - w) / 2);
    }
}

#[test]
fn out_of_range_positions_extrapolate() {
    assert_eq!(place(10, 80, CANVAS, 11).y, 1100);
    assert_eq!(place(10, 80, CANVAS, -1).y, -100);
}

#[test]
fn oversized_text_goes_negative() {
    let b = place(700, 10, CANVAS, 0);
    assert_eq!(b.x, -46);
    let b = place(701, 10, CANVAS, 0);
    assert_eq!(b.x, -47);
}

#[test]
fn plate_grows_by_padding() {
    let b = TextBox {
        x: 100,
        y: 200,
        width: 50,
        height: 20,
    };
    let p = b.plate(10);
    assert_eq!(
        p,
        PlateRect {
            x0: 90,
            y0: 190,
            x1: 160,
            y1: 230
        }
    );
    assert!(p.contains(90, 190));
    assert!(!p.contains(160, 200));
    assert_eq!(b.shifted_down(60).y, 260);
}
