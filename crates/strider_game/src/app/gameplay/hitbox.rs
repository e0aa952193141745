use super::types::{Coin, Obstacle};
use super::{
    COIN_SIZE_PX, PLAYER_LEFT_PX, PLAYER_RIGHT_PX, PLAYER_STAND_BOTTOM_PX, PLAYER_STAND_TOP_PX,
};

/// Axis-aligned collision rectangle in play-area pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HitBox {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) right: f32,
    pub(crate) bottom: f32,
}

impl HitBox {
    /// Strict overlap: rectangles sharing only an edge do not collide.
    pub(crate) fn overlaps(&self, other: &HitBox) -> bool {
        self.right > other.left
            && other.right > self.left
            && self.bottom > other.top
            && other.bottom > self.top
    }
}

pub(crate) fn player_hitbox(offset_y: f32) -> HitBox {
    HitBox {
        left: PLAYER_LEFT_PX,
        top: PLAYER_STAND_TOP_PX - offset_y,
        right: PLAYER_RIGHT_PX,
        bottom: PLAYER_STAND_BOTTOM_PX - offset_y,
    }
}

pub(crate) fn obstacle_hitbox(obstacle: &Obstacle) -> HitBox {
    let top = obstacle.kind.band_top_px();
    HitBox {
        left: obstacle.x,
        top,
        right: obstacle.x + obstacle.width,
        bottom: top + obstacle.height,
    }
}

pub(crate) fn coin_hitbox(coin: &Coin) -> HitBox {
    HitBox {
        left: coin.x,
        top: PLAYER_STAND_TOP_PX - coin.offset_y,
        right: coin.x + COIN_SIZE_PX,
        bottom: PLAYER_STAND_TOP_PX + COIN_SIZE_PX - coin.offset_y,
    }
}
