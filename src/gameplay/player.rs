//! Player control: pointer drag and directional keys steer the archer along
//! its lane.

use avian2d::prelude::LinearVelocity;
use bevy::input::touch::Touch;
use bevy::prelude::*;

use super::animation::Animator;
use super::{Behavior, Behaviors, Facing};
use crate::config::PlayerTuning;
use crate::{GameSet, gameplay_running};

/// Below this horizontal speed the archer counts as standing still.
const STILL_SPEED: f32 = 0.01;

/// Input already translated to world x.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum MoverInput {
    PointerDown(f32),
    PointerDrag(f32),
    PointerUp,
    DirectionDown(Facing),
    DirectionUp,
}

/// Walks toward a target x inside `[left_bound, right_bound]`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DragMover {
    pub move_speed: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    pub dead_zone: f32,
    target_x: Option<f32>,
    dragging: bool,
}

impl DragMover {
    #[must_use]
    pub const fn new(tuning: &PlayerTuning) -> Self {
        Self {
            move_speed: tuning.move_speed,
            left_bound: tuning.left_bound,
            right_bound: tuning.right_bound,
            dead_zone: tuning.dead_zone,
            target_x: None,
            dragging: false,
        }
    }

    #[must_use]
    pub const fn target_x(&self) -> Option<f32> {
        self.target_x
    }

    fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.left_bound, self.right_bound.max(self.left_bound))
    }

    fn apply(&mut self, input: MoverInput, current_x: f32) {
        match input {
            MoverInput::PointerDown(x) => {
                self.dragging = true;
                self.target_x = Some(self.clamp(x));
            }
            MoverInput::PointerDrag(x) if self.dragging => self.target_x = Some(self.clamp(x)),
            MoverInput::PointerDrag(_) => {}
            MoverInput::PointerUp => {
                self.dragging = false;
                self.target_x = Some(current_x);
            }
            MoverInput::DirectionDown(Facing::Left) => self.target_x = Some(self.left_bound),
            MoverInput::DirectionDown(Facing::Right) => {
                self.target_x = Some(self.right_bound.max(self.left_bound));
            }
            MoverInput::DirectionUp => self.target_x = Some(current_x),
        }
    }

    /// Horizontal velocity that reaches the target without overshooting.
    #[must_use]
    pub fn velocity_x(&self, current_x: f32, dt: f32) -> f32 {
        let Some(target_x) = self.target_x else {
            return 0.0;
        };
        let gap = target_x - current_x;
        if gap.abs() <= self.dead_zone {
            return 0.0;
        }
        let speed = if dt > 0.0 {
            self.move_speed.min(gap.abs() / dt)
        } else {
            self.move_speed
        };
        speed.copysign(gap)
    }
}

fn read_pointer_input(
    window: Option<Single<&Window>>,
    camera: Option<Single<(&Camera, &GlobalTransform), With<Camera2d>>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    buttons: Query<&Interaction, With<Button>>,
    mut inputs: MessageWriter<MoverInput>,
) {
    let (Some(window), Some(camera)) = (window, camera) else {
        return;
    };
    let (camera, camera_transform) = *camera;
    let to_world_x = |screen: Vec2| {
        camera
            .viewport_to_world_2d(camera_transform, screen)
            .ok()
            .map(|world| world.x)
    };

    if mouse.just_released(MouseButton::Left) || touches.any_just_released() {
        inputs.write(MoverInput::PointerUp);
        return;
    }

    // Presses on ability buttons are not drags.
    let over_ui = buttons
        .iter()
        .any(|interaction| *interaction != Interaction::None);

    let touch = touches.iter().next();
    let screen = touch
        .map(Touch::position)
        .or_else(|| window.cursor_position());
    let Some(world_x) = screen.and_then(to_world_x) else {
        return;
    };

    let just_pressed = mouse.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    let held = mouse.pressed(MouseButton::Left) || touch.is_some();
    if just_pressed && !over_ui {
        inputs.write(MoverInput::PointerDown(world_x));
    } else if held {
        inputs.write(MoverInput::PointerDrag(world_x));
    }
}

fn read_direction_keys(keys: Res<ButtonInput<KeyCode>>, mut inputs: MessageWriter<MoverInput>) {
    if keys.any_just_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        inputs.write(MoverInput::DirectionDown(Facing::Left));
    } else if keys.any_just_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        inputs.write(MoverInput::DirectionDown(Facing::Right));
    } else if keys.any_just_released([
        KeyCode::KeyA,
        KeyCode::ArrowLeft,
        KeyCode::KeyD,
        KeyCode::ArrowRight,
    ]) {
        inputs.write(MoverInput::DirectionUp);
    }
}

fn drive_movers(
    time: Res<Time>,
    mut inputs: MessageReader<MoverInput>,
    mut movers: Query<(
        &mut DragMover,
        &Behaviors,
        &Transform,
        &mut LinearVelocity,
        &mut Facing,
        Option<&mut Animator>,
    )>,
) {
    let inputs: Vec<MoverInput> = inputs.read().copied().collect();
    let dt = time.delta_secs();

    for (mut mover, behaviors, transform, mut velocity, mut facing, animator) in &mut movers {
        let x = transform.translation.x;
        for input in &inputs {
            mover.apply(*input, x);
        }

        velocity.x = if behaviors.is_enabled(Behavior::Movement) {
            mover.velocity_x(x, dt)
        } else {
            0.0
        };

        let moving = velocity.x.abs() > STILL_SPEED;
        *facing = if moving && velocity.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        if let Some(mut animator) = animator {
            animator.is_moving = moving;
            animator.speed = velocity.x.abs();
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<DragMover>();
    app.add_message::<MoverInput>();

    app.add_systems(
        Update,
        ((read_pointer_input, read_direction_keys), drive_movers)
            .chain()
            .in_set(GameSet::Input)
            .run_if(gameplay_running),
    );
}
