use retroblit::{
    Display, InputEvent, PaletteManager, PixelFormat, RenderTarget, Screen, Surface,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use sdl2::keyboard::Keycode;
use std::time::Instant;

/// Parse command line arguments and return (width, height, vsync)
fn parse_args() -> (u32, u32, bool) {
    let args: Vec<String> = std::env::args().collect();
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;
    let mut vsync = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => vsync = false,
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        width = w;
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        height = h;
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: retroblit [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --width W, -w W    Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H   Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --no-vsync         Disable VSync for uncapped framerate");
                println!("  --help             Show this help message");
                std::process::exit(0);
            },
            _ => {},
        }
        i += 1;
    }

    (width, height, vsync)
}

/// Build a 32x32 ball sprite on the transparent-pink background.
fn make_ball_sprite() -> Surface {
    let fmt = PixelFormat::rgba8888();
    let mut sprite = Surface::with_depth(32, 32, 32);
    sprite.clear(sprite.mask_color());
    sprite.circle_fill(16, 16, 14, fmt.rgb_to_color(230, 90, 40));
    sprite.circle_fill(11, 11, 5, fmt.rgb_to_color(255, 190, 150));
    sprite.circle_fill(20, 8, 2, fmt.rgb_to_color(255, 255, 255));
    sprite
}

/// Pre-render a checkered backdrop into an off-screen surface.
fn make_backdrop(width: i32, height: i32) -> Surface {
    let fmt = PixelFormat::rgba8888();
    let dark = fmt.rgb_to_color(28, 30, 48);
    let light = fmt.rgb_to_color(38, 42, 64);
    let mut backdrop = Surface::with_depth(32, width, height);
    const TILE: i32 = 40;
    for ty in 0..(height + TILE - 1) / TILE {
        for tx in 0..(width + TILE - 1) / TILE {
            let color = if (tx + ty) % 2 == 0 { dark } else { light };
            backdrop.rect_fill(tx * TILE, ty * TILE, (tx + 1) * TILE, (ty + 1) * TILE, color);
        }
    }
    backdrop
}

fn main() -> Result<(), String> {
    let (width, height, vsync) = parse_args();
    let fmt = PixelFormat::rgba8888();

    let (mut display, texture_creator) = Display::with_options("retroblit", width, height, vsync)?;
    let mut screen = Screen::new(width as i32, height as i32);
    let mut target =
        RenderTarget::with_size(&texture_creator, width, height, screen.surface().format())?;

    let palettes = PaletteManager::new();
    let sprite = make_ball_sprite();
    let backdrop = make_backdrop(width as i32, height as i32);

    println!("=== retroblit demo ===");
    println!("Resolution: {}x{}", width, height);
    println!("Escape to quit.");

    let w = width as i32;
    let h = height as i32;
    let (mut ball_x, mut ball_y) = (40.0_f32, 60.0_f32);
    let (mut vel_x, mut vel_y) = (140.0_f32, 90.0_f32);
    let start = Instant::now();
    let mut last_frame = Instant::now();

    'main: loop {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;
        let t = start.elapsed().as_secs_f32();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                _ => {},
            }
        }

        // Bounce the ball inside the window
        ball_x += vel_x * dt;
        ball_y += vel_y * dt;
        if ball_x < 0.0 || ball_x > (w - 32) as f32 {
            vel_x = -vel_x;
            ball_x = ball_x.clamp(0.0, (w - 32) as f32);
        }
        if ball_y < 0.0 || ball_y > (h - 32) as f32 {
            vel_y = -vel_y;
            ball_y = ball_y.clamp(0.0, (h - 32) as f32);
        }

        let surface = screen.surface_mut();
        surface.blit_from(&palettes, &backdrop, 0, 0, 0, 0, w, h);

        // Primitive showcase
        let accent = fmt.rgb_to_color(90, 200, 120);
        surface.rect(20, 20, w - 20, h - 20, accent);
        surface.line(20, 20, w - 21, h - 21, fmt.rgb_to_color(70, 90, 140));
        surface.triangle(
            w / 2,
            40,
            w / 2 - 60,
            130,
            w / 2 + 60,
            130,
            fmt.rgb_to_color(220, 200, 80),
        );
        let pulse = 20 + ((t * 2.0).sin() * 10.0) as i32;
        surface.circle_fill(80, h - 80, pulse, fmt.rgb_to_color(150, 90, 220));

        // Sprite showcase: plain, mirrored, stretched, alpha-lit
        surface.draw_sprite(&palettes, &sprite, ball_x as i32, ball_y as i32);
        surface.draw_sprite_h_flip(&palettes, &sprite, w - 72, 40);
        let stretch = 32 + ((t * 1.5).cos() * 16.0) as i32;
        surface.stretch_sprite(&palettes, &sprite, w - 120, h - 120, stretch, stretch);
        let intensity = (((t.sin() + 1.0) * 0.5) * 255.0) as u8;
        surface.draw_lit_sprite(&sprite, 40, 40, intensity);

        screen.present(&mut display, &mut target, &palettes)?;
    }

    Ok(())
}
