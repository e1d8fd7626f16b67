//! Deterministic creator names and post captions from curated lists.
//!
//! Same RNG stream in, same names out.

use crate::rng::StreamRng;

pub struct NameGenerator;

impl NameGenerator {
    /// "First Last"
    pub fn generate_full_name(rng: &mut StreamRng) -> String {
        let first = rng.pick(Self::first_names());
        let last = rng.pick(Self::last_names());
        format!("{first} {last}")
    }

    /// A caption for a post in `category`, e.g.
    /// "Morning protein shake before leg day #fitness #ad".
    pub fn generate_caption(rng: &mut StreamRng, category: &str) -> String {
        let opener = rng.pick(Self::caption_openers());
        let subject = rng.pick(Self::caption_subjects());
        let hook = rng.pick(Self::caption_hooks());
        format!(
            "{opener} {subject} {hook} #{} #ad",
            category.to_lowercase().replace(' ', "")
        )
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Aarav", "Vivaan", "Aditya", "Arjun", "Reyansh", "Kabir", "Rohan", "Ishaan",
            "Karan", "Nikhil", "Siddharth", "Varun", "Rahul", "Vikram", "Dev", "Aman",
            "James", "Daniel", "Ethan", "Noah", "Lucas", "Mason",
            "Ananya", "Diya", "Isha", "Kavya", "Meera", "Priya", "Riya", "Saanvi",
            "Tara", "Neha", "Pooja", "Sneha", "Aditi", "Nisha", "Shreya", "Zoya",
            "Emma", "Olivia", "Sophia", "Mia", "Ava", "Chloe",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Sharma", "Verma", "Gupta", "Mehta", "Iyer", "Nair", "Reddy", "Kapoor",
            "Malhotra", "Chopra", "Bose", "Sen", "Das", "Patel", "Shah", "Joshi",
            "Kulkarni", "Desai", "Pillai", "Menon", "Rao", "Singh", "Khan", "Ali",
            "Smith", "Johnson", "Brown", "Taylor", "Wilson", "Clark", "Lewis", "Walker",
        ]
    }

    fn caption_openers() -> &'static [&'static str] {
        &[
            "Morning", "Post-workout", "Weekend", "Late-night", "Daily", "Honest",
            "Quick", "My go-to", "Week 4 of my", "Trying the new",
        ]
    }

    fn caption_subjects() -> &'static [&'static str] {
        &[
            "protein shake", "multivitamin routine", "whey isolate", "fish oil stack",
            "pre-workout", "collagen boost", "biotin gummies", "meal prep",
            "recovery drink", "green tea extract",
        ]
    }

    fn caption_hooks() -> &'static [&'static str] {
        &[
            "before leg day", "that actually works", "review with link in bio",
            "with code SAVE10", "for busy mornings", "results so far",
            "everyone keeps asking about", "vs. the old one",
        ]
    }
}
