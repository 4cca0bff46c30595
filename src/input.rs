// ============================================================================
// input.rs — Sim Engine
// Keyboard state tracking for held movement keys and mouse-look accumulation.
// ============================================================================

use crate::camera::CameraMovement;

/// Tracks which navigation keys are currently held down.
#[derive(Default)]
pub struct KeysHeld {
    pub w: bool,
    pub s: bool,
    pub a: bool,
    pub d: bool,
}

impl KeysHeld {
    /// Movements for this frame. Opposing keys resolve first-wins: W over S,
    /// A over D. At most one movement per axis.
    pub fn movements(&self) -> impl Iterator<Item = CameraMovement> {
        let longitudinal = if self.w {
            Some(CameraMovement::Forward)
        } else if self.s {
            Some(CameraMovement::Backward)
        } else {
            None
        };
        let lateral = if self.a {
            Some(CameraMovement::Left)
        } else if self.d {
            Some(CameraMovement::Right)
        } else {
            None
        };
        longitudinal.into_iter().chain(lateral)
    }
}

/// Turns relative mouse motion into look offsets.
///
/// Deltas are accumulated into a virtual cursor. The first sample only primes
/// the last position, so it produces no rotation.
#[derive(Default)]
pub struct MouseLook {
    cursor: (f64, f64),
    last: Option<(f64, f64)>,
}

impl MouseLook {
    /// Feed one motion delta; returns `(x_offset, y_offset)` with y positive
    /// when the mouse moved up.
    pub fn on_motion(&mut self, dx: f64, dy: f64) -> (f32, f32) {
        self.cursor.0 += dx;
        self.cursor.1 += dy;
        let (x, y) = self.cursor;

        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));

        ((x - last_x) as f32, (last_y - y) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(keys: &KeysHeld) -> Vec<CameraMovement> {
        keys.movements().collect()
    }

    #[test]
    fn test_no_keys() {
        assert!(collect(&KeysHeld::default()).is_empty());
    }

    #[test]
    fn test_single_axes() {
        let keys = KeysHeld {
            s: true,
            d: true,
            ..Default::default()
        };
        assert_eq!(
            collect(&keys),
            vec![CameraMovement::Backward, CameraMovement::Right]
        );
    }

    #[test]
    fn test_opposing_keys_first_wins() {
        let keys = KeysHeld {
            w: true,
            s: true,
            a: true,
            d: true,
        };
        assert_eq!(
            collect(&keys),
            vec![CameraMovement::Forward, CameraMovement::Left]
        );
    }

    #[test]
    fn test_first_motion_is_swallowed() {
        let mut look = MouseLook::default();
        assert_eq!(look.on_motion(15.0, -4.0), (0.0, 0.0));
        assert_eq!(look.on_motion(3.0, 2.0), (3.0, -2.0));
        assert_eq!(look.on_motion(-1.0, -5.0), (-1.0, 5.0));
    }

    #[test]
    fn test_zero_motion() {
        let mut look = MouseLook::default();
        look.on_motion(1.0, 1.0);
        assert_eq!(look.on_motion(0.0, 0.0), (0.0, 0.0));
    }
}
