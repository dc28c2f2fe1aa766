use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{Document, Element};

use crate::dom;
use crate::error::{EffectsError, Installed};

const LIKE_BUTTON: &str = ".fb-like-btn";
const REPLY_BUTTON: &str = ".fb-reply-btn";
const ACTIONS: &str = ".fb-actions";
const REACTION_COUNT: &str = ".fb-reaction-count";
const LIKED_CLASS: &str = "liked";

/// Reaction total for one `.fb-actions` container. The page text is read once when the
/// widget is bound, afterwards the display is rendered from here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReactionTally {
    baseline: i64,
    net: i64,
}

impl ReactionTally {
    pub fn from_text(text: &str) -> Self {
        Self {
            baseline: parse_count(text),
            net: 0,
        }
    }

    pub fn apply(&mut self, delta: i64) {
        self.net = self.net.saturating_add(delta);
    }

    /// Not floored: unliking a pre-liked button over "0" shows -1.
    pub fn count(&self) -> i64 {
        self.baseline.saturating_add(self.net)
    }

    /// Applies one click on a button in this container and returns the new display HTML.
    pub fn click(&mut self, state: &mut LikeState) -> String {
        self.apply(state.toggle());
        render_reaction(self.count())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
}

impl LikeState {
    /// Flips the state and returns the change to apply to the tally.
    pub fn toggle(&mut self) -> i64 {
        self.liked = !self.liked;
        if self.liked {
            1
        } else {
            -1
        }
    }
}

/// Digits only. A run too long for `i64` saturates rather than resetting to zero.
pub fn parse_count(text: &str) -> i64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|_| {
        log::debug!("Reaction count {} overflows, saturating", digits);
        i64::MAX
    })
}

/// `1205` -> `"1,205"`
pub fn format_count(count: i64) -> String {
    let digits = count.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if count < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn render_reaction(count: i64) -> String {
    format!(
        r#"<span class="fb-reaction-icon">👍</span> {}"#,
        format_count(count)
    )
}

struct LikeWidget {
    button: Element,
    display: Option<Element>,
    tally: Option<Rc<RefCell<ReactionTally>>>,
    state: LikeState,
}

impl LikeWidget {
    fn on_click(&mut self) {
        match (&self.display, &self.tally) {
            (Some(display), Some(tally)) => {
                let html = tally.borrow_mut().click(&mut self.state);
                display.set_inner_html(&html);
            }
            _ => {
                self.state.toggle();
            }
        }
        let _ = self
            .button
            .class_list()
            .toggle_with_force(LIKED_CLASS, self.state.liked);
    }
}

/// Containers seen so far, so buttons in the same `.fb-actions` share one tally.
#[derive(Default)]
struct Tallies {
    seen: Vec<(Element, Rc<RefCell<ReactionTally>>)>,
}

impl Tallies {
    fn for_container(&mut self, actions: &Element, display: &Element) -> Rc<RefCell<ReactionTally>> {
        if let Some((_, tally)) = self.seen.iter().find(|(seen, _)| seen == actions) {
            return tally.clone();
        }
        let text = display.text_content().unwrap_or_default();
        let tally = Rc::new(RefCell::new(ReactionTally::from_text(&text)));
        self.seen.push((actions.clone(), tally.clone()));
        tally
    }
}

fn bind_like_button(button: Element, tallies: &mut Tallies) -> Result<(), EffectsError> {
    let display = match button.closest(ACTIONS)? {
        Some(actions) => actions
            .query_selector(REACTION_COUNT)?
            .map(|display| (actions, display)),
        None => None,
    };
    let tally = display
        .as_ref()
        .map(|(actions, display)| tallies.for_container(actions, display));

    let state = LikeState {
        liked: button.class_list().contains(LIKED_CLASS),
    };
    let mut widget = LikeWidget {
        button: button.clone(),
        display: display.map(|(_, display)| display),
        tally,
        state,
    };
    dom::listen(&button, "click", move |_| widget.on_click())
}

fn bind_reply_button(button: Element) -> Result<(), EffectsError> {
    let Some(html) = dom::as_html(&button) else {
        return Ok(());
    };
    dom::listen(&button, "click", move |_| {
        let _ = dom::set_styles(&html, &[("font-weight", "700")]);
    })
}

pub fn install(document: &Document) -> Result<Installed, EffectsError> {
    let like_buttons = dom::query_all(document, LIKE_BUTTON)?;
    let reply_buttons = dom::query_all(document, REPLY_BUTTON)?;
    if like_buttons.is_empty() && reply_buttons.is_empty() {
        return Ok(Installed::Skipped);
    }

    let mut tallies = Tallies::default();
    let likes = like_buttons.len();
    for button in like_buttons {
        bind_like_button(button, &mut tallies)?;
    }
    let replies = reply_buttons.len();
    for button in reply_buttons {
        bind_reply_button(button)?;
    }

    log::info!(
        "Discussion widgets bound: {} like buttons, {} reply buttons, {} reaction counters",
        likes,
        replies,
        tallies.seen.len()
    );
    Ok(Installed::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_then_unlike_round_trips_the_display() {
        let mut tally = ReactionTally::from_text("👍 1,204");
        let mut state = LikeState::default();

        tally.apply(state.toggle());
        assert!(state.liked);
        assert_eq!(render_reaction(tally.count()), r#"<span class="fb-reaction-icon">👍</span> 1,205"#);

        tally.apply(state.toggle());
        assert!(!state.liked);
        assert_eq!(render_reaction(tally.count()), r#"<span class="fb-reaction-icon">👍</span> 1,204"#);
    }

    #[test]
    fn clicks_render_the_full_display_each_time() {
        let mut tally = ReactionTally::from_text("👍 1,204");
        let mut state = LikeState::default();

        assert_eq!(tally.click(&mut state), r#"<span class="fb-reaction-icon">👍</span> 1,205"#);
        assert!(state.liked);
        assert_eq!(tally.click(&mut state), r#"<span class="fb-reaction-icon">👍</span> 1,204"#);
        assert!(!state.liked);
    }

    #[test]
    fn final_count_is_initial_plus_likes_minus_unlikes() {
        let mut tally = ReactionTally::from_text("37");
        let mut state = LikeState::default();
        let (mut likes, mut unlikes) = (0, 0);

        for _ in 0..9 {
            let delta = state.toggle();
            if delta > 0 {
                likes += 1;
            } else {
                unlikes += 1;
            }
            tally.apply(delta);
        }

        assert_eq!(tally.count(), 37 + likes - unlikes);
        assert!(state.liked);
        assert_eq!(tally.count(), 38);
    }

    #[test]
    fn two_buttons_sharing_a_tally_accumulate() {
        let mut tally = ReactionTally::from_text("10");
        let mut first = LikeState::default();
        let mut second = LikeState::default();

        tally.apply(first.toggle());
        tally.apply(second.toggle());
        assert_eq!(tally.count(), 12);

        tally.apply(first.toggle());
        assert_eq!(tally.count(), 11);
    }

    #[test]
    fn pre_liked_button_unlikes_first() {
        let mut tally = ReactionTally::from_text("5");
        let mut state = LikeState { liked: true };

        tally.apply(state.toggle());
        assert_eq!(tally.count(), 4);
    }

    #[test]
    fn pre_liked_button_over_zero_goes_negative_and_back() {
        let mut tally = ReactionTally::from_text("0");
        let mut state = LikeState { liked: true };

        assert_eq!(tally.click(&mut state), r#"<span class="fb-reaction-icon">👍</span> -1"#);
        assert_eq!(tally.count(), -1);
        assert_eq!(tally.click(&mut state), r#"<span class="fb-reaction-icon">👍</span> 0"#);
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn oversized_count_saturates() {
        let mut tally = ReactionTally::from_text("99,999,999,999,999,999,999");
        assert_eq!(tally.count(), i64::MAX);

        let mut state = LikeState { liked: true };
        tally.click(&mut state);
        assert_eq!(tally.count(), i64::MAX - 1);
        tally.click(&mut state);
        assert_eq!(tally.count(), i64::MAX);
    }

    #[test]
    fn parse_count_keeps_only_digits() {
        assert_eq!(parse_count("👍 1,204"), 1204);
        assert_eq!(parse_count(" 12 "), 12);
        assert_eq!(parse_count("no reactions"), 0);
        assert_eq!(parse_count("123456789012345678901234"), i64::MAX);
        assert_eq!(parse_count(""), 0);
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1205), "1,205");
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(-4321), "-4,321");
    }
}
