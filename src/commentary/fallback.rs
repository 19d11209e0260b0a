//! Canned announcer lines used when no remote provider is configured or
//! a remote call fails
//!
//! Lines are fixed templates with `{name}` and `{song}` placeholders,
//! grouped by context and picked pseudo-randomly. Selection never fails,
//! so a transition always has an announcement ready.

use rand::seq::SliceRandom;

const GENERIC_INTROS: &[&str] = &[
    "Coming to the staaaage... {name} with '{song}'! This is gonna be GOOD!",
    "Put your hands together for {name}! They're about to absolutely CRUSH '{song}'!",
    "Give it up for the one, the only... {name}! Bringing you '{song}'!",
    "Ladies and gentlemen, {name} is ready to make some MAGIC with '{song}'!",
    "Here comes {name} with '{song}'! The crowd is already hyped!",
    "Making their way to the stage... {name}! Let's hear it for '{song}'!",
    "{name} is about to show us how it's DONE with '{song}'! Let's GO!",
    "You wanted a star? You GOT a star! {name} performing '{song}'!",
];

const VIP_INTROS: &[&str] = &[
    "THE GUEST OF HONOR TAKES THE STAGE! ALL HAIL {name}!",
    "Make way for ROYALTY! {name} is blessing us with '{song}'!",
    "The star of the night, THE reason we're all here... {name} with '{song}'!",
    "EVERYBODY ON YOUR FEET! The legend {name} is performing '{song}'!",
    "This is THEIR moment! {name} absolutely OWNING '{song}'! LET'S GOOO!",
];

const RETURNING_INTROS: &[&str] = &[
    "{name} is BACK for more! They're on FIRE tonight with '{song}'!",
    "The crowd favorite returns! {name} with another banger: '{song}'!",
    "{name} said 'one more won't hurt' and we are HERE for it! '{song}'!",
    "You can't keep a good singer down! {name} returns with '{song}'!",
];

fn fill(template: &str, name: &str, song: &str) -> String {
    template.replace("{name}", name).replace("{song}", song)
}

fn pick(pool: &[&str]) -> &'static str {
    // Pools are non-empty constants; choose only fails on an empty slice
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(GENERIC_INTROS[0])
}

/// Performer introduction, keyed by VIP status and whether they have
/// already sung tonight
pub fn intro_line(guest_name: &str, song_title: &str, is_vip: bool, songs_completed: u32) -> String {
    let pool = if is_vip {
        VIP_INTROS
    } else if songs_completed > 0 {
        RETURNING_INTROS
    } else {
        GENERIC_INTROS
    };
    fill(pick(pool), guest_name, song_title)
}

/// Post-performance line, with a nod to notably long performances
pub fn post_song_line(guest_name: &str, song_title: &str, duration_secs: Option<i64>) -> String {
    let minutes = duration_secs.unwrap_or(0) / 60;
    let verdict = if minutes > 5 {
        "What a marathon!"
    } else {
        "Solid effort!"
    };
    format!("That was {guest_name} with \"{song_title}\"! {verdict}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        for _ in 0..20 {
            let line = intro_line("Dana", "Twist and Shout", false, 0);
            assert!(line.contains("Dana"));
            assert!(!line.contains("{name}"));
            assert!(!line.contains("{song}"));
        }
    }

    #[test]
    fn vip_pool_wins_over_returning() {
        let expanded: Vec<String> = VIP_INTROS
            .iter()
            .map(|t| fill(t, "Kristin", "Dancing Queen"))
            .collect();
        for _ in 0..20 {
            let line = intro_line("Kristin", "Dancing Queen", true, 4);
            assert!(expanded.contains(&line));
        }
    }

    #[test]
    fn returning_pool_used_after_first_song() {
        let expanded: Vec<String> = RETURNING_INTROS
            .iter()
            .map(|t| fill(t, "Bob", "Hey Jude"))
            .collect();
        for _ in 0..20 {
            let line = intro_line("Bob", "Hey Jude", false, 2);
            assert!(expanded.contains(&line));
        }
    }

    #[test]
    fn post_song_line_notes_marathons() {
        let short = post_song_line("Ana", "Creep", Some(240));
        assert!(short.ends_with("Solid effort!"));

        let long = post_song_line("Ana", "American Pie", Some(381));
        assert!(long.ends_with("What a marathon!"));

        let unknown = post_song_line("Ana", "Creep", None);
        assert!(unknown.ends_with("Solid effort!"));
    }
}
