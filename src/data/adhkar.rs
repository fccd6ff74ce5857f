//! Daily remembrances (adhkar)
//!
//! A small built-in collection, grouped by when each is recited.

use clap::ValueEnum;
use std::fmt;

/// When a remembrance is recited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DhikrCategory {
    /// After Fajr until sunrise
    Morning,
    /// After Asr until sunset
    Evening,
    /// After each obligatory prayer
    Prayer,
    /// At any time
    Absolute,
}

impl DhikrCategory {
    /// Returns a slice containing all categories in display order
    pub fn all() -> &'static [DhikrCategory] {
        &[
            DhikrCategory::Morning,
            DhikrCategory::Evening,
            DhikrCategory::Prayer,
            DhikrCategory::Absolute,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            DhikrCategory::Morning => "Morning",
            DhikrCategory::Evening => "Evening",
            DhikrCategory::Prayer => "After prayer",
            DhikrCategory::Absolute => "Any time",
        }
    }

    /// Arabic heading for the category
    pub fn arabic_label(self) -> &'static str {
        match self {
            DhikrCategory::Morning => "أذكار الصباح",
            DhikrCategory::Evening => "أذكار المساء",
            DhikrCategory::Prayer => "أذكار بعد الصلاة",
            DhikrCategory::Absolute => "أذكار مطلقة",
        }
    }
}

impl fmt::Display for DhikrCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One remembrance and how many times to repeat it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dhikr {
    pub id: u16,
    pub category: DhikrCategory,
    pub text: &'static str,
    /// Number of repetitions
    pub count: u16,
    /// Hadith collection the text is narrated in
    pub reference: Option<&'static str>,
    /// Reward mentioned in the narration
    pub benefit: Option<&'static str>,
}

/// The built-in collection, in recitation order
pub const ADHKAR: &[Dhikr] = &[
    Dhikr {
        id: 1,
        category: DhikrCategory::Morning,
        text: "أَصْبَحْنَا وَأَصْبَحَ الْمُلْكُ لِلَّهِ، وَالْحَمْدُ لِلَّهِ لاَ إِلَهَ إِلاَّ اللَّهُ وَحْدَهُ لاَ شَرِيكَ لَهُ، لَهُ الْمُلْكُ وَلَهُ الْحَمْدُ وَهُوَ عَلَى كُلِّ شَيْءٍ قَدِيرٌ",
        count: 1,
        reference: Some("رواه مسلم"),
        benefit: None,
    },
    Dhikr {
        id: 2,
        category: DhikrCategory::Morning,
        text: "سُبْحَانَ اللهِ وَبِحَمْدِهِ",
        count: 100,
        reference: None,
        benefit: Some("حطت خطاياه وإن كانت مثل زبد البحر"),
    },
    Dhikr {
        id: 3,
        category: DhikrCategory::Evening,
        text: "أَمْسَيْنَا وَأَمْسَى الْمُلْكُ لِلَّهِ، وَالْحَمْدُ لِلَّهِ لاَ إِلَهَ إِلاَّ اللَّهُ وَحْدَهُ لاَ شَرِيكَ لَهُ",
        count: 1,
        reference: None,
        benefit: None,
    },
    Dhikr {
        id: 4,
        category: DhikrCategory::Absolute,
        text: "أَسْتَغْفِرُ اللَّهَ وَأَتُوبُ إِلَيْهِ",
        count: 100,
        reference: None,
        benefit: None,
    },
    Dhikr {
        id: 5,
        category: DhikrCategory::Prayer,
        text: "سُبْحَانَ اللَّهِ (33)، الْحَمْدُ لِلَّهِ (33)، اللَّهُ أَكْبَرُ (33)",
        count: 33,
        reference: None,
        benefit: None,
    },
];

/// Remembrances in the given category, or all of them for `None`
pub fn by_category(category: Option<DhikrCategory>) -> impl Iterator<Item = &'static Dhikr> {
    ADHKAR
        .iter()
        .filter(move |dhikr| category.map_or(true, |c| dhikr.category == c))
}
