use macroquad::prelude::*;
use macroquad_blockmap::BlockMap;

// Flat-color layout: rows are listed bottom row first. Textured tiles would
// add texture_paths and overlay_info entries to the key.
const LAYOUT: &str = r#"{
  "cell_size": 48,
  "key": {
    "r": { "color": "0.45 0.42 0.40 1" },
    "d": { "color": "0.55 0.35 0.20 1" },
    "w": { "color": "0.25 0.45 0.85 0.8" },
    "b": { "color": "0.18 0.16 0.22 1" }
  },
  "background": [
    "bbbbbbbbbbbbbbbb",
    "bbbbbbbbbbbbbbbb",
    "bbbbbwwwwwwbbbbb",
    "bbbbbwwwwwwbbbbb",
    "bbbbbbbbbbbbbbbb",
    "bbbbbbbbbbbbbbbb",
    "bbbbbbbbbbbbbbbb",
    "bbbbbbbbbbbbbbbb"
  ],
  "middleground": [
    "rrrrrrrrrrrrrrrr",
    "rrrrrrrrrrrrrrrr",
    "rrrrr      rrrrr",
    "dddddd    dddddd",
    "ddd          ddd",
    "dd            dd",
    "       dd       ",
    "                ",
    "      dddd      "
  ],
  "foreground": [
    "",
    "",
    "",
    "            d",
    "",
    "",
    "   d"
  ]
}"#;

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Blockmap".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let path = std::env::temp_dir().join("blockmap_demo.json");
    std::fs::write(&path, LAYOUT).expect("Failed to write demo layout");

    let mut map = BlockMap::load(path.to_str().expect("temp path should be utf8"))
        .await
        .expect("Failed to load block layout");

    loop {
        clear_background(BLACK);

        map.update(get_frame_time());
        let screen_size = Vec2::new(screen_width(), screen_height());
        let drawn = map.draw_visible_rect(Vec2::ZERO, screen_size);

        draw_text(
            &format!("blocks drawn: {drawn}, materials: {}", map.material_count()),
            20.0,
            30.0,
            30.0,
            WHITE,
        );

        // Hover readout for the collision view. Row 0 is the bottom row, so
        // the screen row flips against the grid height.
        let (mx, my) = mouse_position();
        let cx = (mx / map.cell_size) as usize;
        let row_from_top = (my / map.cell_size) as usize;
        if cx < map.width && row_from_top < map.height {
            let cy = map.height - 1 - row_from_top;
            draw_text(
                &format!("cell ({cx}, {cy}) solid: {}", map.occupancy.get(cx, cy)),
                20.0,
                60.0,
                30.0,
                WHITE,
            );
        }

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
