use crate::abtest::{AbTestExperiment, AbTestVariant};

/// Homepage experiments shipped with the site.
pub fn default_experiments() -> Vec<AbTestExperiment> {
    vec![
        AbTestExperiment {
            id: "homepage-hero-variants".to_string(),
            name: "Homepage hero section".to_string(),
            is_active: true,
            traffic_allocation: 100,
            target_page: Some("/".to_string()),
            variants: vec![
                AbTestVariant::new("hero-control", 33)
                    .with_config("headline", "Transform your business with AI automation")
                    .with_config("ctaText", "Get started"),
                AbTestVariant::new("hero-urgency", 33)
                    .with_config("headline", "Stop losing hours to manual work")
                    .with_config("ctaText", "Book a free consultation today"),
                AbTestVariant::new("hero-social-proof", 34)
                    .with_config("headline", "Trusted by teams across Europe")
                    .with_config("ctaText", "See client results"),
            ],
        },
        AbTestExperiment {
            id: "homepage-cta-variants".to_string(),
            name: "Homepage call to action".to_string(),
            is_active: true,
            traffic_allocation: 100,
            target_page: Some("/".to_string()),
            variants: vec![
                AbTestVariant::new("cta-primary", 50)
                    .with_config("ctaText", "Get a free prototype")
                    .with_config("ctaStyle", "primary"),
                AbTestVariant::new("cta-consultation", 50)
                    .with_config("ctaText", "Talk to an expert")
                    .with_config("ctaStyle", "secondary"),
            ],
        },
    ]
}
