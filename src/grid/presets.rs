//! Decoration layouts used by the app's tip grids.

use super::{DecorMap, DecorSlot};

const BEE: &str = "/img/1bee.png";

fn slot(
    src: &str,
    size: (&str, &str),
    top: &str,
    left: &str,
    rotate: Option<&str>,
    transform: &str,
    z: Option<i32>,
) -> DecorSlot {
    DecorSlot {
        src: Some(src.to_string()),
        width: size.0.to_string(),
        height: size.1.to_string(),
        top: top.to_string(),
        left: Some(left.to_string()),
        rotate: rotate.map(str::to_string),
        transform: Some(transform.to_string()),
        z,
    }
}

/// "My tips" grid: bees at 4, 11 and 16, blank hexagons at 5 and 10.
pub fn mytip() -> DecorMap {
    DecorMap::from([
        (
            4,
            slot(
                BEE,
                ("w-[80%]", "h-[80%]"),
                "b-[-20%]",
                "left-[120%]",
                Some("rotate-[15deg]"),
                "translateX(-50%)",
                Some(5),
            ),
        ),
        (
            5,
            slot(
                "",
                ("w-[110%]", "h-[110%]"),
                "-top-5",
                "left-[50%]",
                None,
                "translateX(-50%)",
                None,
            ),
        ),
        (
            10,
            slot(
                "",
                ("w-[150%]", "h-[150%]"),
                "-top-10",
                "left-[5]",
                Some("-rotate-[10deg]"),
                "translateX(-50%)",
                None,
            ),
        ),
        (
            11,
            slot(
                BEE,
                ("w-[40%]", "h-[40%]"),
                "-top-[30%]",
                "left-[85%]",
                Some("rotate-[-30deg]"),
                "translateX(-50%) scaleX(-1)",
                Some(30),
            ),
        ),
        (
            16,
            slot(
                BEE,
                ("w-[280%]", "h-[28%]"),
                "-top-[150%]",
                "left-[10%]",
                Some("rotate-[-30deg]"),
                "translateX(-50%) scaleX(-1)",
                Some(5),
            ),
        ),
    ])
}
