//! 门磁 / 漏水标志聚合。
//!
//! 每个物理传感器占一位；任一位置位时对应汇总指示灯为 On。

use domain::IndicatorState;

/// 两组标志位：门未关、漏水。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagAggregator {
    doors: u8,
    floods: u8,
}

impl FlagAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 门磁事件：contact=false（门开）置位，contact=true 清位，缺失不改。
    pub fn door_event(&mut self, bit: u8, contact: Option<bool>) -> IndicatorState {
        match contact {
            Some(false) => self.doors |= bit_mask(bit),
            Some(true) => self.doors &= !bit_mask(bit),
            None => {}
        }
        self.door_indicator()
    }

    /// 漏水事件：leak=true 置位，leak=false 清位，缺失不改。
    pub fn flood_event(&mut self, bit: u8, leak: Option<bool>) -> IndicatorState {
        match leak {
            Some(true) => self.floods |= bit_mask(bit),
            Some(false) => self.floods &= !bit_mask(bit),
            None => {}
        }
        self.flood_indicator()
    }

    pub fn door_mask(&self) -> u8 {
        self.doors
    }

    pub fn flood_mask(&self) -> u8 {
        self.floods
    }

    pub fn door_indicator(&self) -> IndicatorState {
        aggregate(self.doors)
    }

    pub fn flood_indicator(&self) -> IndicatorState {
        aggregate(self.floods)
    }
}

fn bit_mask(bit: u8) -> u8 {
    1u8.checked_shl(u32::from(bit)).unwrap_or(0)
}

fn aggregate(mask: u8) -> IndicatorState {
    if mask != 0 {
        IndicatorState::On
    } else {
        IndicatorState::Off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_mask_tracks_open_doors() {
        let mut flags = FlagAggregator::new();
        assert_eq!(flags.door_indicator(), IndicatorState::Off);
        assert_eq!(flags.door_event(0, Some(false)), IndicatorState::On);
        assert_eq!(flags.door_event(3, Some(false)), IndicatorState::On);
        assert_eq!(flags.door_mask(), 0b1001);
        assert_eq!(flags.door_event(0, Some(true)), IndicatorState::On);
        assert_eq!(flags.door_mask(), 0b1000);
        assert_eq!(flags.door_event(3, Some(true)), IndicatorState::Off);
        assert_eq!(flags.door_mask(), 0);
    }

    #[test]
    fn closing_a_closed_door_keeps_mask() {
        let mut flags = FlagAggregator::new();
        flags.door_event(1, Some(false));
        assert_eq!(flags.door_event(2, Some(true)), IndicatorState::On);
        assert_eq!(flags.door_mask(), 0b0010);
    }

    #[test]
    fn flood_mask_tracks_leaks() {
        let mut flags = FlagAggregator::new();
        assert_eq!(flags.flood_event(2, Some(true)), IndicatorState::On);
        assert_eq!(flags.flood_event(1, Some(false)), IndicatorState::On);
        assert_eq!(flags.flood_mask(), 0b100);
        assert_eq!(flags.flood_event(2, Some(false)), IndicatorState::Off);
        assert_eq!(flags.door_mask(), 0);
    }

    #[test]
    fn missing_value_leaves_mask_unchanged() {
        let mut flags = FlagAggregator::new();
        flags.flood_event(0, Some(true));
        assert_eq!(flags.flood_event(0, None), IndicatorState::On);
        assert_eq!(flags.door_event(0, None), IndicatorState::Off);
    }

    #[test]
    fn out_of_range_bit_is_ignored() {
        let mut flags = FlagAggregator::new();
        assert_eq!(flags.door_event(8, Some(false)), IndicatorState::Off);
        assert_eq!(flags.door_mask(), 0);
    }
}
