use std::sync::Arc;

use roster_core::config::section;
use roster_core::template::Template;
use roster_types::MaskKind;
use tokio::sync::RwLock;

use crate::state::AppState;

pub async fn join(name: &str, state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    if state.players.find(name).is_some() {
        println!("{name} is already online");
        return;
    }
    let id = state.players.join(name);
    tracing::info!(player = name, %id, "joined");
    println!("{name} joined as {id}");
}

pub async fn leave(name: &str, state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    match state.players.leave(name) {
        Some(id) => {
            for mask in &state.masks {
                mask.refresh(id);
            }
            println!("{name} left");
        }
        None => println!("{name} is not online"),
    }
}

pub async fn hide(viewer: &str, target: &str, state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    let (Some(viewer_id), Some(target_id)) = (state.players.find(viewer), state.players.find(target))
    else {
        println!("both players must be online");
        return;
    };
    let visible = state.players.toggle_hidden(viewer_id, target_id);
    for mask in &state.masks {
        mask.refresh(viewer_id);
    }
    let verb = if visible { "can see" } else { "no longer sees" };
    println!("{viewer} {verb} {target}");
}

/// Advance the primary lane.
pub async fn tick(count: u32, state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    for _ in 0..count {
        state.scheduler.tick();
    }
    println!("now at tick {}", state.scheduler.current_tick());
}

pub async fn render(viewer: &str, state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    let Some(viewer_id) = state.players.find(viewer) else {
        println!("{viewer} is not online");
        return;
    };
    for mask in &state.masks {
        let buttons = mask.buttons(viewer_id);
        println!("[{}]", mask.name());
        if buttons.is_empty() {
            println!("  (empty)");
        }
        for (slot, button) in buttons.iter().enumerate() {
            let label = state.vars.apply(button.name(), Some(viewer_id));
            println!("  {slot:>2}: {label}");
        }
    }
}

pub async fn list_masks(state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    println!("{} mask(s) from {}", state.masks.len(), state.menu_path.display());
    for mask in &state.masks {
        println!("  {}", mask.name());
    }
}

/// Print every mask's settings after defaults are applied.
pub async fn show_settings(state: Arc<RwLock<AppState>>) {
    let state = state.read().await;
    let tick = section::millis_per_tick(&state.menu);
    let Some(masks) = state.menu.get("mask").and_then(Template::as_table) else {
        println!("no masks configured");
        return;
    };
    for (name, mask) in masks {
        let Some(mask) = mask.as_table() else {
            continue;
        };
        let kind = mask
            .get("type")
            .and_then(Template::as_str)
            .and_then(MaskKind::from_name);
        let rendered = match kind {
            Some(MaskKind::Animated) => toml::to_string_pretty(&section::animated_settings(mask)),
            Some(_) => toml::to_string_pretty(&section::value_list_settings(mask, tick)),
            None => continue,
        };
        match rendered {
            Ok(text) => println!("[mask.{name}]\n{text}"),
            Err(e) => println!("[mask.{name}] failed to render: {e}"),
        }
    }
}

pub async fn exit(state: Arc<RwLock<AppState>>) {
    state.write().await.stop();
    println!("bye");
}
