pub mod analysis;

pub use analysis::{
    AnalysisService, BandsReport, DrawdownReport, RollingSnapshot, SeasonalityAnalysis,
    ZScoreReport,
};
