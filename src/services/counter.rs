//! 数字计数器动画
//!
//! 元素首次达到可见比例时启动，每帧按 `target / frames` 递增并向上取整，
//! 直到达到目标值。

use std::time::Duration;

use crate::config::config::CounterConfig;

/// 计数器动画帧序列
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: f64,
    increment: f64,
    current: f64,
    percent: bool,
    done: bool,
}

impl CounterAnimation {
    pub fn new(target: u64, frames: u32, percent: bool) -> Self {
        let target = target as f64;
        Self {
            target,
            increment: target / f64::from(frames.max(1)),
            current: 0.0,
            percent,
            done: false,
        }
    }

    /// 解析 "95%" 这样的目标文本
    pub fn parse(target: &str, frames: u32) -> Option<Self> {
        let trimmed = target.trim();
        let (digits, percent) = match trimmed.strip_suffix('%') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        digits
            .trim()
            .parse::<u64>()
            .ok()
            .map(|value| Self::new(value, frames, percent))
    }

    pub fn from_config(target: u64, percent: bool, config: &CounterConfig) -> Self {
        Self::new(target, config.frames, percent)
    }

    fn render(&self, value: f64) -> String {
        if self.percent {
            format!("{}%", value as u64)
        } else {
            format!("{}", value as u64)
        }
    }
}

impl Iterator for CounterAnimation {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        if self.current < self.target {
            self.current = (self.current + self.increment).ceil();
            if self.current < self.target {
                return Some(self.render(self.current));
            }
        }

        // final frame always shows the exact target
        self.done = true;
        Some(self.render(self.target))
    }
}

/// 只触发一次的可见性触发器
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold: f64,
    fired: bool,
}

impl ScrollTrigger {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            fired: false,
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.visibility_threshold)
    }

    /// 报告当前可见比例，首次达到阈值时返回 true
    pub fn observe(&mut self, visible_ratio: f64) -> bool {
        if self.fired || visible_ratio < self.threshold {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

/// 帧间隔
pub fn frame_interval(config: &CounterConfig) -> Duration {
    Duration::from_millis(config.frame_interval_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_target_steps_by_one() {
        let frames: Vec<String> = CounterAnimation::new(3, 200, false).collect();
        assert_eq!(frames, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_large_target_frame_count() {
        let frames: Vec<String> = CounterAnimation::new(1000, 200, false).collect();

        assert_eq!(frames.first().map(String::as_str), Some("5"));
        assert_eq!(frames.last().map(String::as_str), Some("1000"));
        assert_eq!(frames.len(), 200);
    }

    #[test]
    fn test_percent_suffix_preserved() {
        let frames: Vec<String> = CounterAnimation::parse("95%", 200).unwrap().collect();

        assert!(frames.iter().all(|f| f.ends_with('%')));
        assert_eq!(frames.last().map(String::as_str), Some("95%"));
    }

    #[test]
    fn test_zero_target_single_frame() {
        let frames: Vec<String> = CounterAnimation::new(0, 200, false).collect();
        assert_eq!(frames, vec!["0"]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(CounterAnimation::parse("lots", 200).is_none());
    }

    #[test]
    fn test_values_never_decrease() {
        let values: Vec<u64> = CounterAnimation::new(777, 200, false)
            .map(|f| f.parse().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_scroll_trigger_fires_once() {
        let mut trigger = ScrollTrigger::new(0.5);

        assert!(!trigger.observe(0.2));
        assert!(trigger.observe(0.5));
        assert!(!trigger.observe(0.9));
        assert!(trigger.has_fired());
    }

    #[test]
    fn test_scroll_trigger_uses_configured_threshold() {
        let config = CounterConfig {
            visibility_threshold: 0.8,
            ..CounterConfig::default()
        };
        let mut trigger = ScrollTrigger::from_config(&config);

        assert!(!trigger.observe(0.5));
        assert!(trigger.observe(0.8));
        assert!(!trigger.observe(1.0));
    }

    #[test]
    fn test_config_defaults() {
        let config = CounterConfig::default();
        assert_eq!(frame_interval(&config), Duration::from_millis(20));
        let anim = CounterAnimation::from_config(10, false, &config);
        assert_eq!(anim.last().as_deref(), Some("10"));
    }
}
