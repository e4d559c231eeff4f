//! Greedy card builder for the rival brand.
//!
//! Slots are filled in priority order (main event, opener, tag, women's
//! bout, midcard, promos) from the brand's bookable roster. Nobody works
//! twice, last week's pairings are avoided unless they are hot or carried
//! by a storyline, and the finished card is re-validated so an illegal
//! segment can never reach the show runner.

use std::collections::BTreeSet;

use sim_core::config::AiTuning;
use sim_core::titles::{self, TitleHolder, TAG_TITLE, WOMEN_TITLE, WORLD_TITLE};
use sim_core::{
    key_from_names, pair_key, validate_brand_booking, Booking, Brand, Character, Dice, Gender, SegmentSpec, SimConfig, Slot,
    WorldState,
};
use tracing::{debug, warn};

/// Drawing power used for main-event and promo decisions.
pub fn star_score(c: &Character) -> f64 {
    let champ = if c.champion_of.is_empty() { 0.0 } else { 10.0 };
    f64::from(c.star_power) * 0.6 + f64::from(c.likeability) * 0.25 + f64::from(c.momentum) * 0.15 + champ
}

/// In-ring reliability used for openers and tag bouts.
pub fn work_score(c: &Character) -> f64 {
    f64::from(c.work_rate) * 0.60 + f64::from(c.psychology) * 0.30 + f64::from(c.consistency) * 0.10
}

fn talk_score(c: &Character) -> f64 {
    f64::from(c.charisma + c.mic) / 2.0
}

fn sorted_by<'w>(pool: &[&'w Character], score: fn(&Character) -> f64) -> Vec<&'w Character> {
    let mut v = pool.to_vec();
    v.sort_by(|a, b| score(b).total_cmp(&score(a)));
    v
}

struct Planner<'w> {
    world: &'w WorldState,
    brand: Brand,
    ai: &'w AiTuning,
    rematch_heat: i32,
    viable_heat: i32,
    roster: Vec<&'w Character>,
    used: BTreeSet<&'w str>,
    used_pairs: BTreeSet<String>,
    last_keys: BTreeSet<&'w str>,
}

impl<'w> Planner<'w> {
    fn new(world: &'w WorldState, brand: Brand, cfg: &'w SimConfig) -> Self {
        Self {
            world,
            brand,
            ai: &cfg.ai,
            rematch_heat: cfg.story.rematch_heat,
            viable_heat: cfg.story.viable_heat,
            roster: world.available(brand).collect(),
            used: BTreeSet::new(),
            used_pairs: BTreeSet::new(),
            last_keys: world
                .last_week_keys
                .get(&brand)
                .map(|v| v.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }

    fn get(&self, name: &str) -> Option<&'w Character> {
        self.roster.iter().copied().find(|c| c.name == name)
    }

    fn free(&self, name: &str) -> bool {
        !self.used.contains(name)
    }

    fn unused(&self) -> Vec<&'w Character> {
        self.roster.iter().copied().filter(|c| self.free(&c.name)).collect()
    }

    fn legal(&self, a: &Character, b: &Character) -> bool {
        a.name != b.name
            && a.gender == b.gender
            && self.free(&a.name)
            && self.free(&b.name)
            && !self.used_pairs.contains(&pair_key(&a.name, &b.name))
    }

    fn book(&mut self, a: &'w Character, b: &'w Character, title: Option<&str>) -> SegmentSpec {
        self.used.insert(&a.name);
        self.used.insert(&b.name);
        self.used_pairs.insert(pair_key(&a.name, &b.name));
        SegmentSpec::Singles {
            a: a.name.clone(),
            b: b.name.clone(),
            championship: title.map(str::to_string),
        }
    }

    fn story_heat(&self, names: &[&str]) -> i32 {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.world.stories(self.brand).map(|s| s.heat_of(&names)).unwrap_or(0)
    }

    /// First pairing that is not a stale rematch.
    fn fresh_pair(&self, pairs: &[(&'w Character, &'w Character)]) -> Option<(&'w Character, &'w Character)> {
        pairs.iter().copied().find(|(a, b)| {
            let key = key_from_names(&[&a.name, &b.name]);
            let immune = self
                .world
                .hot_matches
                .get(&self.brand)
                .and_then(|m| m.get(&key))
                .is_some_and(|ttl| *ttl > 0);
            !self.last_keys.contains(key.as_str()) || immune || self.story_heat(&[a.name.as_str(), b.name.as_str()]) >= self.rematch_heat
        })
    }

    fn pick_by(&mut self, pool: &[&'w Character], score: fn(&Character) -> f64, floor: f64) -> Option<SegmentSpec> {
        let src = sorted_by(pool, score);
        let mut pairs = Vec::new();
        for (i, a) in src.iter().enumerate() {
            for b in &src[i + 1..] {
                if self.legal(a, b) && (score(a) + score(b)) / 2.0 >= floor {
                    pairs.push((*a, *b));
                }
            }
        }
        let (a, b) = self.fresh_pair(&pairs)?;
        Some(self.book(a, b, None))
    }

    fn pick_any(&mut self, pool: &[&'w Character]) -> Option<SegmentSpec> {
        let src = sorted_by(pool, star_score);
        for (i, a) in src.iter().enumerate() {
            if let Some(b) = src[i + 1..].iter().copied().find(|b| self.legal(a, b)) {
                return Some(self.book(*a, b, None));
            }
        }
        None
    }

    /// Four unused same-gender workers split best-two against next-two by
    /// work rate.
    fn pick_tag(&mut self, pool: &[&'w Character]) -> Option<[[&'w Character; 2]; 2]> {
        let src: Vec<&'w Character> = sorted_by(pool, work_score)
            .into_iter()
            .filter(|c| self.free(&c.name))
            .collect();
        for gender in [Gender::Male, Gender::Female] {
            let g: Vec<&'w Character> = src.iter().copied().filter(|c| c.gender == gender).collect();
            if let [a, b, c, d, ..] = g.as_slice() {
                let teams = [[*a, *b], [*c, *d]];
                self.mark_tag(&teams);
                return Some(teams);
            }
        }
        None
    }

    fn mark_tag(&mut self, teams: &[[&'w Character; 2]; 2]) {
        for c in teams.iter().flatten() {
            self.used.insert(&c.name);
        }
        self.used_pairs.insert(pair_key(&teams[0][0].name, &teams[1][0].name));
        self.used_pairs.insert(pair_key(&teams[0][1].name, &teams[1][1].name));
    }

    fn tag_spec(teams: [[&Character; 2]; 2], title: Option<&str>) -> SegmentSpec {
        SegmentSpec::Tag {
            teams: teams
                .iter()
                .map(|t| t.iter().map(|c| c.name.clone()).collect())
                .collect(),
            championship: title.map(str::to_string),
        }
    }

    /// Hottest storyline whose participants can all work tonight.
    fn viable_story(&self) -> Option<Vec<&'w Character>> {
        let book = self.world.stories(self.brand)?;
        let mut lines: Vec<_> = book.lines.iter().filter(|s| s.heat >= self.viable_heat).collect();
        lines.sort_by(|a, b| b.heat.cmp(&a.heat));
        lines.into_iter().find_map(|s| {
            let cast: Vec<&'w Character> = s.names.iter().filter_map(|n| self.get(n)).collect();
            let same_gender = cast.iter().all(|c| c.gender == cast[0].gender);
            let all_free = cast.iter().all(|c| self.free(&c.name));
            match cast.len() {
                2 if self.legal(cast[0], cast[1]) => Some(cast),
                4 if same_gender && all_free => Some(cast),
                _ => None,
            }
        })
    }

    fn single_holder(&self, title: &str) -> Option<&'w Character> {
        let world = self.world;
        match titles::holder(&world.titles, self.brand, title)? {
            TitleHolder::Single(n) => self.get(n),
            TitleHolder::Team(_) => None,
        }
    }

    fn best_contender(&self, champ: &Character) -> Option<&'w Character> {
        let pool: Vec<&'w Character> = self
            .unused()
            .into_iter()
            .filter(|c| c.gender == champ.gender && c.name != champ.name)
            .collect();
        sorted_by(&pool, star_score).into_iter().next()
    }

    fn avg_star(a: &Character, b: &Character) -> f64 {
        (star_score(a) + star_score(b)) / 2.0
    }

    fn main_event(&mut self, dice: &mut dyn Dice) -> Option<SegmentSpec> {
        if let Some(cast) = self.viable_story() {
            if let [a, b] = cast[..] {
                if Self::avg_star(a, b) >= self.ai.main_avg_star {
                    return Some(self.book(a, b, None));
                }
            }
        }
        if let Some(champ) = self.single_holder(WORLD_TITLE) {
            if dice.chance(self.ai.world_defense) {
                if let Some(c) = self.best_contender(champ) {
                    if self.legal(champ, c) && Self::avg_star(champ, c) >= self.ai.main_avg_star {
                        return Some(self.book(champ, c, Some(WORLD_TITLE)));
                    }
                }
            }
        }
        if titles::titles_for(self.brand).contains(&WOMEN_TITLE) {
            if let Some(champ) = self.single_holder(WOMEN_TITLE) {
                if let Some(c) = self.best_contender(champ) {
                    if self.legal(champ, c)
                        && Self::avg_star(champ, c) >= self.ai.main_women_star
                        && dice.chance(self.ai.women_main_event)
                    {
                        return Some(self.book(champ, c, Some(WOMEN_TITLE)));
                    }
                }
            }
        }
        let men: Vec<&'w Character> = self.roster.iter().copied().filter(|c| c.gender == Gender::Male).collect();
        let pool = if men.len() >= 2 { men } else { self.roster.clone() };
        if let Some(s) = self.pick_by(&pool, star_score, self.ai.main_avg_star) {
            return Some(s);
        }
        let all = self.roster.clone();
        self.pick_by(&all, star_score, self.ai.main_avg_star - 5.0)
            .or_else(|| self.pick_any(&all))
    }

    fn opener(&mut self) -> Option<SegmentSpec> {
        let pool = self.unused();
        self.pick_by(&pool, work_score, self.ai.opener_avg_work)
            .or_else(|| self.pick_by(&pool, work_score, self.ai.opener_avg_work - 4.0))
            .or_else(|| self.pick_any(&pool))
    }

    fn tag(&mut self, dice: &mut dyn Dice) -> Option<SegmentSpec> {
        let world = self.world;
        if let Some(TitleHolder::Team([x, y])) = titles::holder(&world.titles, self.brand, TAG_TITLE) {
            if let (Some(h1), Some(h2)) = (self.get(x), self.get(y)) {
                if self.free(&h1.name) && self.free(&h2.name) && dice.chance(self.ai.tag_defense) {
                    let pool: Vec<&'w Character> = self
                        .unused()
                        .into_iter()
                        .filter(|c| c.gender == h1.gender && c.name != h1.name && c.name != h2.name)
                        .collect();
                    let opp: Vec<&'w Character> = sorted_by(&pool, work_score).into_iter().take(2).collect();
                    if let [o1, o2] = opp[..] {
                        let teams = [[h1, h2], [o1, o2]];
                        self.mark_tag(&teams);
                        return Some(Self::tag_spec(teams, Some(TAG_TITLE)));
                    }
                }
            }
        }
        if let Some(cast) = self.viable_story() {
            if let [a, b, c, d] = cast[..] {
                let teams = [[a, b], [c, d]];
                self.mark_tag(&teams);
                return Some(Self::tag_spec(teams, None));
            }
        }
        let pool = self.unused();
        self.pick_tag(&pool).map(|t| Self::tag_spec(t, None))
    }

    fn women(&mut self, dice: &mut dyn Dice) -> Option<SegmentSpec> {
        let pool: Vec<&'w Character> = self.unused().into_iter().filter(|c| c.gender == Gender::Female).collect();
        if pool.len() < 2 {
            return None;
        }
        if titles::titles_for(self.brand).contains(&WOMEN_TITLE) {
            if let Some(champ) = self.single_holder(WOMEN_TITLE) {
                if dice.chance(self.ai.women_defense) {
                    if let Some(c) = self.best_contender(champ) {
                        if self.legal(champ, c) {
                            return Some(self.book(champ, c, Some(WOMEN_TITLE)));
                        }
                    }
                }
            }
        }
        self.pick_by(&pool, star_score, self.ai.women_avg_star)
            .or_else(|| self.pick_any(&pool))
    }

    /// Midcard bout favoring contrasting styles.
    fn midcard(&mut self) -> Option<SegmentSpec> {
        let pool = self.unused();
        let src = sorted_by(&pool, star_score);
        let flyer = |c: &Character| c.work_rate >= 70 && c.stamina >= 65;
        let big = |c: &Character| c.durability >= 70;
        let tech = |c: &Character| c.psychology >= 70;
        for (i, &a) in src.iter().enumerate() {
            for &b in &src[i + 1..] {
                if !self.legal(a, b) {
                    continue;
                }
                let contrast = (flyer(a) && tech(b)) || (flyer(b) && tech(a)) || big(a) != big(b);
                if contrast {
                    return Some(self.book(a, b, None));
                }
            }
        }
        self.pick_by(&pool, star_score, self.ai.mid_avg_star)
            .or_else(|| self.pick_any(&pool))
    }

    fn speaker(&mut self, main_event: &[String]) -> Option<SegmentSpec> {
        let book = self.world.stories(self.brand);
        let in_story = |name: &str| book.is_some_and(|s| s.in_any_story(name));
        let mut pool: Vec<&'w Character> = self
            .roster
            .iter()
            .copied()
            .filter(|c| self.free(&c.name) || main_event.contains(&c.name))
            .collect();
        pool.sort_by(|a, b| talk_score(b).total_cmp(&talk_score(a)));
        let strong: Vec<&'w Character> = pool
            .iter()
            .copied()
            .filter(|c| talk_score(c) >= self.ai.min_promo)
            .collect();
        let choose = |arr: &[&'w Character]| -> Option<&'w Character> {
            arr.iter()
                .copied()
                .find(|c| main_event.contains(&c.name))
                .or_else(|| arr.iter().copied().find(|c| !c.champion_of.is_empty()))
                .or_else(|| arr.iter().copied().find(|c| in_story(&c.name)))
                .or_else(|| arr.first().copied())
        };
        let pick = choose(&strong).or_else(|| choose(&pool))?;
        self.used.insert(&pick.name);
        Some(SegmentSpec::Promo {
            speaker: pick.name.clone(),
            text: None,
        })
    }
}

fn put(card: &mut Booking, slot: Slot, spec: Option<SegmentSpec>) {
    if let Some(s) = spec {
        card.insert(slot, s);
    }
}

fn singles_names(spec: Option<&SegmentSpec>) -> Vec<String> {
    match spec {
        Some(SegmentSpec::Singles { a, b, .. }) => vec![a.clone(), b.clone()],
        _ => Vec::new(),
    }
}

/// Book a full card for `brand`. The result always passes
/// [`validate_brand_booking`] for `brand`; slots that cannot be filled legally are left empty.
pub fn ai_booking(world: &WorldState, brand: Brand, cfg: &SimConfig, dice: &mut dyn Dice) -> Booking {
    let mut p = Planner::new(world, brand, cfg);
    let mut card = Booking::new();

    let me = p.main_event(dice);
    let me_names = singles_names(me.as_ref());
    put(&mut card, Slot::MainEvent, me);
    let opener = p.opener();
    put(&mut card, Slot::Opener, opener);
    let tag = p.tag(dice);
    put(&mut card, Slot::Tag, tag);
    if let Some(w) = p.women(dice) {
        let slot = if card.contains_key(&Slot::PreShow) { Slot::Match } else { Slot::PreShow };
        card.insert(slot, w);
    }
    if !card.contains_key(&Slot::Match) {
        let mid = p.midcard();
        put(&mut card, Slot::Match, mid);
    }
    for slot in [Slot::PreShow, Slot::Opener, Slot::Match, Slot::MainEvent] {
        if !card.contains_key(&slot) {
            let pool = p.unused();
            let fill = p.pick_any(&pool);
            put(&mut card, slot, fill);
        }
    }
    let promo1 = p.speaker(&me_names);
    put(&mut card, Slot::Promo1, promo1);
    let promo2 = p.speaker(&[]);
    put(&mut card, Slot::Promo2, promo2);

    // Nothing illegal leaves here. A rejected bout gets one last-resort
    // replacement from the remaining pool; after that the slot stays empty.
    let mut replaced = BTreeSet::new();
    while let Err(e) = validate_brand_booking(&world.roster, brand, &card) {
        match e.slot().filter(|s| card.contains_key(s)) {
            Some(slot) => {
                warn!(%brand, %slot, error = %e, "dropping illegal AI segment");
                card.remove(&slot);
                if slot.title_eligible() || slot == Slot::PreShow {
                    if replaced.insert(slot) {
                        let pool = p.unused();
                        let fill = p.pick_any(&pool);
                        put(&mut card, slot, fill);
                    }
                }
            }
            None => {
                warn!(%brand, error = %e, "AI card rejected; booking nothing");
                card.clear();
                break;
            }
        }
    }
    debug!(%brand, segments = card.len(), "AI card booked");
    card
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::seed::{champion_seed, seed_roster};
    use sim_core::{repair_world, FlatDice, SeededDice};

    fn world() -> WorldState {
        let mut w = WorldState {
            roster: seed_roster(),
            titles: champion_seed(),
            ..WorldState::default()
        };
        repair_world(&mut w);
        w
    }

    fn names(card: &Booking) -> Vec<String> {
        card.iter()
            .filter(|(s, _)| !matches!(s, Slot::Promo1 | Slot::Promo2))
            .flat_map(|(_, spec)| spec.names().into_iter().map(str::to_string))
            .collect()
    }

    #[test]
    fn full_card_is_legal_and_single_use() {
        let w = world();
        for brand in Brand::COMPETING {
            let card = ai_booking(&w, brand, &SimConfig::default(), &mut FlatDice::quiet());
            assert!(validate_brand_booking(&w.roster, brand, &card).is_ok());
            assert!(card.contains_key(&Slot::MainEvent));
            assert!(card.contains_key(&Slot::Opener));
            let n = names(&card);
            let uniq: BTreeSet<_> = n.iter().collect();
            assert_eq!(n.len(), uniq.len());
            assert!(n.iter().all(|x| w.find(x).is_some_and(|c| c.brand == brand)));
        }
    }

    #[test]
    fn eager_dice_defend_the_world_title() {
        let w = world();
        let card = ai_booking(&w, Brand::Raw, &SimConfig::default(), &mut FlatDice::eager());
        match &card[&Slot::MainEvent] {
            SegmentSpec::Singles { a, championship, .. } => {
                assert_eq!(championship.as_deref(), Some(WORLD_TITLE));
                assert_eq!(a, "Rex Calloway");
            }
            other => panic!("unexpected main event {other:?}"),
        }
        assert!(matches!(
            &card[&Slot::Tag],
            SegmentSpec::Tag { championship: Some(t), .. } if t == TAG_TITLE
        ));
    }

    #[test]
    fn injured_workers_are_skipped() {
        let mut w = world();
        w.find_mut("Rex Calloway").unwrap().injury_weeks = 3;
        let card = ai_booking(&w, Brand::Raw, &SimConfig::default(), &mut FlatDice::eager());
        assert!(!names(&card).contains(&"Rex Calloway".to_string()));
        assert!(validate_brand_booking(&w.roster, Brand::Raw, &card).is_ok());
    }

    #[test]
    fn thin_roster_still_legal() {
        let mut w = world();
        for c in w.roster.iter_mut().filter(|c| c.brand == Brand::SmackDown).skip(3) {
            c.injury_weeks = 2;
        }
        let card = ai_booking(&w, Brand::SmackDown, &SimConfig::default(), &mut FlatDice::quiet());
        assert!(validate_brand_booking(&w.roster, Brand::SmackDown, &card).is_ok());
        assert!(!card.contains_key(&Slot::Tag));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn seeded_cards_always_validate(seed in 0u64..10_000) {
            let w = world();
            let mut dice = SeededDice::new(seed);
            for brand in Brand::COMPETING {
                let card = ai_booking(&w, brand, &SimConfig::default(), &mut dice);
                prop_assert!(validate_brand_booking(&w.roster, brand, &card).is_ok());
            }
        }
    }
}
